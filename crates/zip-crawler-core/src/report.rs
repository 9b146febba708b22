use crate::engine::RunResult;

/// Plain-text summary of a crawl. The same text is printed to the console and
/// sent as the notification body.
pub fn render(result: &RunResult) -> String {
    format!(
        "These files were compressed:\n{}\n\nThese files were not compressed:\n{}\n\nTotal disk savings: {} bytes\n",
        result.compressed_names().join(" "),
        result.uncompressed_names().join(" "),
        result.total_savings_bytes(),
    )
}
