use std::fs;
use std::path::{Path, PathBuf};

use crate::guidance::{MerchantGuidance, parse_guidance};
use crate::integration::mapping::parse_mapping;
use crate::integration::matcher::MappingPair;
use crate::{ClientError, ClientResult};

pub const HOME_ENV_VAR: &str = "SCHEDKIT_HOME";

const GUIDANCE_FILE: &str = "guidance.json";
const MAPPING_FILES: [&str; 2] = ["mapping.json", "mapping.csv"];

/// Read-only merchant configuration loaded from `<home>/merchants/<id>/`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MerchantProfile {
    pub merchant_id: String,
    pub path: PathBuf,
    pub guidance: Option<MerchantGuidance>,
    pub mapping: Vec<MappingPair>,
    pub mapping_source: Option<PathBuf>,
}

/// `home_override`, then `SCHEDKIT_HOME`, then `~/.schedkit`.
pub fn resolve_profile_home(home_override: Option<&Path>) -> ClientResult<PathBuf> {
    if let Some(path) = home_override {
        return Ok(path.to_path_buf());
    }
    if let Some(override_path) = std::env::var_os(HOME_ENV_VAR) {
        return Ok(PathBuf::from(override_path));
    }
    home::home_dir()
        .map(|home_path| home_path.join(".schedkit"))
        .ok_or_else(ClientError::profile_home_unavailable)
}

pub fn merchant_profile_dir(home: &Path, merchant_id: &str) -> PathBuf {
    home.join("merchants").join(merchant_id)
}

pub fn load_merchant_profile(
    merchant_id: &str,
    home_override: Option<&Path>,
) -> ClientResult<MerchantProfile> {
    let merchant_id = validate_merchant_id(merchant_id)?;
    let home = resolve_profile_home(home_override)?;
    let path = merchant_profile_dir(&home, merchant_id);
    if !path.is_dir() {
        return Err(ClientError::profile_not_found(merchant_id, &path));
    }

    let guidance_path = path.join(GUIDANCE_FILE);
    let guidance = if guidance_path.is_file() {
        let content = read_profile_file(&guidance_path)?;
        Some(parse_guidance(&content, &guidance_path.display().to_string())?)
    } else {
        None
    };

    let mut mapping = Vec::new();
    let mut mapping_source = None;
    if let Some(mapping_path) = MAPPING_FILES
        .iter()
        .map(|name| path.join(name))
        .find(|candidate| candidate.is_file())
    {
        let content = read_profile_file(&mapping_path)?;
        mapping = parse_mapping(&content, &mapping_path.display().to_string())?;
        mapping_source = Some(mapping_path);
    }

    tracing::info!(
        merchant_id,
        has_guidance = guidance.is_some(),
        mapping_pairs = mapping.len(),
        "loaded merchant profile"
    );

    Ok(MerchantProfile {
        merchant_id: merchant_id.to_string(),
        path,
        guidance,
        mapping,
        mapping_source,
    })
}

fn validate_merchant_id(merchant_id: &str) -> ClientResult<&str> {
    let trimmed = merchant_id.trim();
    let safe = !trimmed.is_empty()
        && trimmed != "."
        && trimmed != ".."
        && !trimmed.contains(['/', '\\']);
    if !safe {
        return Err(ClientError::invalid_argument(&format!(
            "Merchant id `{merchant_id}` must be a single non-empty path segment."
        )));
    }
    Ok(trimmed)
}

fn read_profile_file(path: &Path) -> ClientResult<String> {
    fs::read_to_string(path).map_err(|error| {
        ClientError::source_read_failed(&path.display().to_string(), &error.to_string())
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{load_merchant_profile, merchant_profile_dir};

    #[test]
    fn loads_guidance_and_json_mapping() {
        let temp = tempfile::tempdir();
        assert!(temp.is_ok());
        let Ok(temp) = temp else {
            return;
        };
        let dir = merchant_profile_dir(temp.path(), "acme");
        assert!(fs::create_dir_all(&dir).is_ok());
        assert!(
            fs::write(
                dir.join("guidance.json"),
                r#"{"excluded_fields": ["discounts"]}"#
            )
            .is_ok()
        );
        assert!(fs::write(dir.join("mapping.json"), r#"[["Support", "SKU-1"]]"#).is_ok());
        assert!(fs::write(dir.join("mapping.csv"), "name,code\nIgnored,SKU-2\n").is_ok());

        let profile = load_merchant_profile("acme", Some(temp.path()));
        assert!(profile.is_ok());
        if let Ok(profile) = profile {
            assert_eq!(profile.merchant_id, "acme");
            assert_eq!(profile.mapping.len(), 1);
            assert_eq!(profile.mapping[0].integration_item, "SKU-1");
            assert!(
                profile
                    .mapping_source
                    .is_some_and(|path| path.ends_with("mapping.json"))
            );
            assert!(
                profile
                    .guidance
                    .is_some_and(|guidance| guidance.excluded_fields == vec!["discounts"])
            );
        }
    }

    #[test]
    fn empty_profile_directory_is_valid() {
        let temp = tempfile::tempdir();
        assert!(temp.is_ok());
        let Ok(temp) = temp else {
            return;
        };
        assert!(fs::create_dir_all(merchant_profile_dir(temp.path(), "bare")).is_ok());

        let profile = load_merchant_profile("bare", Some(temp.path()));
        assert!(profile.is_ok());
        if let Ok(profile) = profile {
            assert!(profile.guidance.is_none());
            assert!(profile.mapping.is_empty());
        }
    }

    #[test]
    fn missing_profile_and_unsafe_ids_fail() {
        let temp = tempfile::tempdir();
        assert!(temp.is_ok());
        let Ok(temp) = temp else {
            return;
        };

        let missing = load_merchant_profile("ghost", Some(temp.path()));
        assert!(missing.as_ref().is_err_and(|error| error.code == "profile_not_found"));

        for unsafe_id in ["", "..", "a/b"] {
            let rejected = load_merchant_profile(unsafe_id, Some(temp.path()));
            assert!(rejected.is_err_and(|error| error.code == "invalid_argument"));
        }
    }
}
