use std::fs;
use std::io::{IsTerminal, Read};
use std::path::Path;

use crate::guidance::{MerchantGuidance, parse_guidance};
use crate::integration::mapping::parse_mapping;
use crate::integration::matcher::MappingPair;
use crate::profile::{MerchantProfile, load_merchant_profile};
use crate::schedule::payload::{ExtractionPayload, parse_payload};
use crate::{ClientError, ClientResult};

pub const STDIN_PATH: &str = "-";
const STDIN_LABEL: &str = "stdin";

/// Text read from a file path or, for `-`, from stdin.
#[derive(Debug, Clone)]
pub(crate) struct SourceText {
    pub(crate) label: String,
    pub(crate) content: String,
}

pub(crate) fn read_source(
    path: &str,
    stdin_override: Option<&str>,
    command: &str,
) -> ClientResult<SourceText> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            "A source path is required. Pass a file path or `-` for stdin.",
            Some(command),
        ));
    }

    if trimmed == STDIN_PATH {
        let content = match stdin_override {
            Some(value) => value.to_string(),
            None => read_stdin()?,
        };
        if content.trim().is_empty() {
            return Err(ClientError::invalid_argument_for_command(
                "Path `-` means stdin input, but stdin was empty. Pipe the payload or pass a file path.",
                Some(command),
            ));
        }
        return Ok(SourceText {
            label: STDIN_LABEL.to_string(),
            content,
        });
    }

    let content = fs::read_to_string(trimmed)
        .map_err(|error| ClientError::source_read_failed(trimmed, &error.to_string()))?;
    Ok(SourceText {
        label: trimmed.to_string(),
        content,
    })
}

fn read_stdin() -> ClientResult<String> {
    if std::io::stdin().is_terminal() {
        return Ok(String::new());
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|error| ClientError::source_read_failed(STDIN_LABEL, &error.to_string()))?;
    Ok(buffer)
}

pub(crate) fn load_payload(
    path: &str,
    stdin_override: Option<&str>,
    command: &str,
) -> ClientResult<(String, ExtractionPayload)> {
    let source = read_source(path, stdin_override, command)?;
    let payload = parse_payload(&source.content, &source.label)?;
    tracing::debug!(
        source = %source.label,
        schedules = payload.schedules.len(),
        issues = payload.issues.len(),
        "parsed extraction payload"
    );
    Ok((source.label, payload))
}

pub(crate) fn load_mapping_file(path: &str, command: &str) -> ClientResult<(String, Vec<MappingPair>)> {
    let source = read_source(path, None, command)?;
    let pairs = parse_mapping(&source.content, &source.label)?;
    Ok((source.label, pairs))
}

pub(crate) fn load_guidance_file(path: &str, command: &str) -> ClientResult<MerchantGuidance> {
    let source = read_source(path, None, command)?;
    parse_guidance(&source.content, &source.label)
}

pub(crate) fn load_profile(
    merchant: Option<&str>,
    home_override: Option<&Path>,
) -> ClientResult<Option<MerchantProfile>> {
    merchant
        .map(|merchant_id| load_merchant_profile(merchant_id, home_override))
        .transpose()
}

/// Explicit mapping path first, then the merchant profile's table.
pub(crate) fn resolve_mapping(
    explicit: Option<&str>,
    profile: Option<&MerchantProfile>,
    command: &str,
) -> ClientResult<Option<(String, Vec<MappingPair>)>> {
    if let Some(path) = explicit {
        return load_mapping_file(path, command).map(Some);
    }
    Ok(profile.and_then(|profile| {
        profile.mapping_source.as_ref().map(|source| {
            (source.display().to_string(), profile.mapping.clone())
        })
    }))
}

/// Explicit guidance path first, then the merchant profile's guidance.
pub(crate) fn resolve_guidance(
    explicit: Option<&str>,
    profile: Option<&MerchantProfile>,
    command: &str,
) -> ClientResult<Option<MerchantGuidance>> {
    if let Some(path) = explicit {
        return load_guidance_file(path, command).map(Some);
    }
    Ok(profile.and_then(|profile| profile.guidance.clone()))
}
