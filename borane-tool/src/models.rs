use std::io::Write;

use borane_openrouter::{ModelInfo, OpenRouterClient};

use crate::error::BorError;

/// Models whose id contains `filter`, case-insensitively, sorted by id.
pub fn filter_models<'a>(models: &'a [ModelInfo], filter: Option<&str>) -> Vec<&'a ModelInfo> {
    let needle = filter.map(str::to_lowercase);
    let mut matched: Vec<&ModelInfo> = models
        .iter()
        .filter(|m| match &needle {
            Some(n) => m.id.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .collect();
    matched.sort_by(|a, b| a.id.cmp(&b.id));
    matched
}

pub async fn run<W: Write>(
    client: &OpenRouterClient,
    filter: Option<&str>,
    out: &mut W,
) -> Result<(), BorError> {
    let response = client.list_models().await?;

    for model in filter_models(&response.data, filter) {
        match model.context_length {
            Some(ctx) => writeln!(out, "{:<60} {:>8}", model.id, ctx)?,
            None => writeln!(out, "{}", model.id)?,
        }
    }

    Ok(())
}
