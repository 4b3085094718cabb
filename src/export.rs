use anyhow::{Result, anyhow, bail};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TYPE: ExportType = ExportType::Csv;
pub const DEFAULT_LANG: &str = "xml";
pub const DEFAULT_FIELDS_FROM_ALL_VERSIONS: &str = "true";
pub const DEFAULT_HIERARCHY_IN_LABELS: &str = "false";
pub const DEFAULT_GROUP_SEP: &str = "/";

/// File format of an export. Only the formats accepted by the `exports/` endpoint
/// through a plain form post are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    Csv,
    Xls,
}

impl ExportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportType::Csv => "csv",
            ExportType::Xls => "xls",
        }
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedExportType(pub String);

impl fmt::Display for UnsupportedExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Only csv and xls are supported with this method")
    }
}

impl std::error::Error for UnsupportedExportType {}

impl FromStr for ExportType {
    type Err = UnsupportedExportType;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportType::Csv),
            "xls" => Ok(ExportType::Xls),
            other => Err(UnsupportedExportType(other.to_string())),
        }
    }
}

/// Options of a new export.
///
/// The boolean-looking fields are kept as strings: the API expects the literal
/// values `"true"` / `"false"` in the form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportParams {
    pub export_type: ExportType,
    pub lang: String,
    pub fields_from_all_versions: String,
    pub hierarchy_in_labels: String,
    pub group_sep: String,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            export_type: DEFAULT_TYPE,
            lang: DEFAULT_LANG.to_string(),
            fields_from_all_versions: DEFAULT_FIELDS_FROM_ALL_VERSIONS.to_string(),
            hierarchy_in_labels: DEFAULT_HIERARCHY_IN_LABELS.to_string(),
            group_sep: DEFAULT_GROUP_SEP.to_string(),
        }
    }
}

impl ExportParams {
    /// Maps positional values onto the parameters in order
    /// (type, lang, fields_from_all_versions, hierarchy_in_labels, group_sep).
    /// Missing trailing values keep their defaults.
    pub fn from_positional<S: AsRef<str>>(
        args: &[S],
    ) -> std::result::Result<Self, UnsupportedExportType> {
        let mut params = Self::default();
        let args: Vec<&str> = args.iter().map(|s| s.as_ref()).collect();
        let mut args = args.into_iter();

        if let Some(t) = args.next() {
            params.export_type = t.parse()?;
        }
        let slots = [
            &mut params.lang,
            &mut params.fields_from_all_versions,
            &mut params.hierarchy_in_labels,
            &mut params.group_sep,
        ];
        for (slot, value) in slots.into_iter().zip(args) {
            *slot = value.to_string();
        }

        Ok(params)
    }

    pub(crate) fn to_form(&self, source: String) -> ExportForm<'_> {
        ExportForm {
            source,
            kind: self.export_type,
            lang: &self.lang,
            fields_from_all_versions: &self.fields_from_all_versions,
            hierarchy_in_labels: &self.hierarchy_in_labels,
            group_sep: &self.group_sep,
        }
    }
}

/// Form body of `POST exports/`.
#[derive(Debug, Serialize)]
pub(crate) struct ExportForm<'a> {
    pub(crate) source: String,
    #[serde(rename = "type")]
    pub(crate) kind: ExportType,
    pub(crate) lang: &'a str,
    pub(crate) fields_from_all_versions: &'a str,
    pub(crate) hierarchy_in_labels: &'a str,
    pub(crate) group_sep: &'a str,
}

/// Response of a successful export creation, kept raw.
#[derive(Debug, Clone)]
pub struct CreatedExport {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct ExportList {
    pub results: Vec<ExportRecord>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ExportRecord {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Download URL once the export has been generated.
    #[serde(default)]
    pub result: Option<String>,
}

impl ExportList {
    /// The last record in server order, which the API returns oldest first.
    pub fn latest(&self) -> Option<&ExportRecord> {
        self.results.last()
    }

    pub(crate) fn latest_url(&self, asset_id: &str) -> Result<String> {
        let record = self
            .latest()
            .ok_or_else(|| anyhow!("no exports found for asset {}", asset_id))?;

        match record.result.as_deref() {
            Some(url) if !url.is_empty() => Ok(url.to_string()),
            _ => bail!(
                "latest export {} has no result URL (status: {})",
                record.uid.as_deref().unwrap_or("(unknown uid)"),
                record.status.as_deref().unwrap_or("unknown")
            ),
        }
    }
}
