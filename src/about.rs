pub const ADLEMAN_DISPLAY_VERSION: &str = env!("ADLEMAN_DISPLAY_VERSION");
pub const ADLEMAN_BUILD_N: &str = env!("ADLEMAN_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "adleman {}\nBuild {}\nStrand-level DNA computing simulator",
        ADLEMAN_DISPLAY_VERSION, ADLEMAN_BUILD_N
    )
}
