//! Where command results go: stdout as text, stdout as a JSON envelope, or
//! a report file.

use std::path::Path;

use {serde::Serialize, tracing::info};

#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Emit a Markdown report with its structured form.
    ///
    /// `--output` writes the Markdown to a file. The JSON envelope, when
    /// requested, still goes to stdout.
    pub fn report<T: Serialize>(
        &self,
        markdown: &str,
        data: &T,
        file: Option<&Path>,
    ) -> anyhow::Result<()> {
        if let Some(path) = file {
            skilldeck_common::fs::write_atomic(path, markdown)?;
            info!(path = %path.display(), "report written");
            if !self.json {
                eprintln!("Report written to {}", path.display());
            }
        }
        if self.json {
            self.data(data)
        } else {
            if file.is_none() {
                print!("{markdown}");
            }
            Ok(())
        }
    }

    pub fn data<T: Serialize>(&self, data: &T) -> anyhow::Result<()> {
        println!("{}", envelope(data)?);
        Ok(())
    }
}

pub fn envelope<T: Serialize>(data: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&serde_json::json!({
        "ok": true,
        "data": data,
    }))?)
}

pub fn error_envelope(error: &anyhow::Error) -> String {
    serde_json::json!({
        "ok": false,
        "error": format!("{error:#}"),
    })
    .to_string()
}
