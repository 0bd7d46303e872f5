#![forbid(unsafe_code)]

pub(crate) fn build_profile_label() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

pub(crate) fn build_git_sha() -> Option<&'static str> {
    option_env!("CC_GIT_SHA").and_then(|v| {
        let v = v.trim();
        if v.is_empty() { None } else { Some(v) }
    })
}

/// `<version>+git.<sha>.<profile>`, or `<version>+<profile>` outside a checkout.
pub(crate) fn build_fingerprint() -> String {
    let version = crate::VIEWER_VERSION;
    let profile = build_profile_label();
    match build_git_sha() {
        Some(sha) => format!("{version}+git.{sha}.{profile}"),
        None => format!("{version}+{profile}"),
    }
}
