use std::path::Path;

use crate::commands::common::{load_profile, resolve_mapping};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::MatchData;
use crate::integration::matcher::match_integration_item;
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct MatchRunOptions<'a> {
    pub item_name: String,
    pub mapping: Option<String>,
    pub merchant: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn run(
    item_name: &str,
    mapping: Option<&str>,
    merchant: Option<&str>,
) -> ClientResult<SuccessEnvelope> {
    run_with_options(MatchRunOptions {
        item_name: item_name.to_string(),
        mapping: mapping.map(std::string::ToString::to_string),
        merchant: merchant.map(std::string::ToString::to_string),
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: MatchRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    if options.mapping.is_none() && options.merchant.is_none() {
        return Err(ClientError::invalid_argument_for_command(
            "Pass a mapping table with `--mapping <path>` or a merchant profile with `--merchant <id>`.",
            Some("match"),
        ));
    }

    let profile = load_profile(options.merchant.as_deref(), options.home_override)?;
    let Some((mapping_source, pairs)) =
        resolve_mapping(options.mapping.as_deref(), profile.as_ref(), "match")?
    else {
        return Err(ClientError::invalid_argument_for_command(
            "The merchant profile has no mapping.json or mapping.csv.",
            Some("match"),
        ));
    };

    let result = match_integration_item(&options.item_name, &pairs);
    tracing::info!(
        item_name = %options.item_name,
        confidence = result.match_confidence.as_str(),
        mapping_pairs = pairs.len(),
        "matched item name"
    );

    success(
        "match",
        MatchData {
            item_name: options.item_name,
            mapping_source,
            mapping_pairs: pairs.len(),
            result,
        },
    )
}
