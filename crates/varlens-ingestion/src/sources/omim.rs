//! OMIM entry API client.
//!
//! Endpoint: https://api.omim.org/api/entry?mimNumber={mim}&include={section}&apiKey={key}
//!
//! Two sections feed the gene-description workflow:
//!   text:molecularGenetics → free-text `textSectionContent`
//!   geneMap                → `phenotypeMap` records

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use varlens_common::{ensure_success, Result, SandboxClient, VarlensError};

pub const OMIM_ENTRY_URL: &str = "https://api.omim.org/api/entry";

/// One row of an OMIM gene's phenotype map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhenotypeMapEntry {
    pub mim_number: String,
    pub phenotype: String,
    pub phenotype_mim_number: String,
    pub phenotype_mapping_key: String,
    pub phenotype_inheritance: String,
}

/// Column names, in table order.
const PHENOTYPE_COLUMNS: [&str; 5] = [
    "mimNumber",
    "phenotype",
    "phenotypeMimNumber",
    "phenotypeMappingKey",
    "phenotypeInheritance",
];

impl PhenotypeMapEntry {
    fn field_mut(&mut self, tag: &[u8]) -> Option<&mut String> {
        match tag {
            b"mimNumber"            => Some(&mut self.mim_number),
            b"phenotype"            => Some(&mut self.phenotype),
            b"phenotypeMimNumber"   => Some(&mut self.phenotype_mim_number),
            b"phenotypeMappingKey"  => Some(&mut self.phenotype_mapping_key),
            b"phenotypeInheritance" => Some(&mut self.phenotype_inheritance),
            _ => None,
        }
    }

    fn columns(&self) -> [&str; 5] {
        [
            &self.mim_number,
            &self.phenotype,
            &self.phenotype_mim_number,
            &self.phenotype_mapping_key,
            &self.phenotype_inheritance,
        ]
    }
}

pub struct OmimClient {
    client: SandboxClient,
    base_url: String,
    api_key: Option<String>,
}

impl OmimClient {
    pub fn new(client: SandboxClient, api_key: Option<String>) -> Self {
        Self { client, base_url: OMIM_ENTRY_URL.to_string(), api_key }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Raw XML for one entry section.
    #[instrument(skip(self))]
    pub async fn entry(&self, mim_number: &str, include: &str) -> Result<String> {
        if mim_number.is_empty() || !mim_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(VarlensError::InvalidInput(format!(
                "'{}' is not an OMIM number",
                mim_number
            )));
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| VarlensError::Config("OMIM API key is not set".to_string()))?;

        let resp = self.client
            .get(&self.base_url)?
            .query(&[("mimNumber", mim_number), ("include", include), ("apiKey", api_key)])
            .send()
            .await?;
        let xml = ensure_success(resp)?.text().await?;
        debug!(bytes = xml.len(), "OMIM entry fetched");
        Ok(xml)
    }

    /// Molecular-genetics narrative for a gene entry.
    pub async fn molecular_genetics(&self, mim_number: &str) -> Result<String> {
        let xml = self.entry(mim_number, "text:molecularGenetics").await?;
        text_section(&xml, "textSectionContent")?.ok_or_else(|| {
            VarlensError::NotFound(format!("molecular genetics section for MIM {}", mim_number))
        })
    }

    /// Phenotype map rows for a gene entry (possibly empty).
    pub async fn gene_map(&self, mim_number: &str) -> Result<Vec<PhenotypeMapEntry>> {
        let xml = self.entry(mim_number, "geneMap").await?;
        phenotype_map(&xml)
    }
}

fn xml_error(e: impl std::fmt::Display) -> VarlensError {
    VarlensError::Xml(e.to_string())
}

/// Text directly inside the first `<tag>` element, up to its first child.
pub fn text_section(xml: &str, tag: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut capturing = false;
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if !capturing => {
                capturing = e.name().as_ref() == tag.as_bytes();
            }
            Ok(Event::Start(_)) | Ok(Event::Empty(_)) | Ok(Event::End(_)) if capturing => break,
            Ok(Event::Text(ref e)) if capturing => {
                text.push_str(&e.unescape().map_err(xml_error)?);
            }
            Ok(Event::CData(e)) if capturing => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok((!text.is_empty()).then_some(text))
}

/// Every `<phenotypeMap>` record in document order.
pub fn phenotype_map(xml: &str) -> Result<Vec<PhenotypeMapEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<PhenotypeMapEntry> = None;
    let mut field: Option<Vec<u8>> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"phenotypeMap" => current = Some(PhenotypeMapEntry::default()),
                name if current.is_some() => field = Some(name.to_vec()),
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if let (Some(entry), Some(tag)) = (current.as_mut(), field.as_deref()) {
                    if let Some(slot) = entry.field_mut(tag) {
                        slot.push_str(&e.unescape().map_err(xml_error)?);
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"phenotypeMap" => {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    field = None;
                }
                _ => field = None,
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

/// Pipe table with one row per phenotype; empty input gives an empty string.
pub fn phenotypes_to_markdown(entries: &[PhenotypeMapEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(entries.len() + 2);
    lines.push(format!("| {} |", PHENOTYPE_COLUMNS.join(" | ")));
    let dashes: Vec<String> = PHENOTYPE_COLUMNS.iter().map(|c| "-".repeat(c.len())).collect();
    lines.push(format!("| {} |", dashes.join(" | ")));
    for entry in entries {
        lines.push(format!("| {} |", entry.columns().join(" | ")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENE_MAP_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<omim version="1.0">
  <entryList>
    <entry>
      <mimNumber>606530</mimNumber>
      <geneMap>
        <mimNumber>606530</mimNumber>
        <phenotypeMapList>
          <phenotypeMap>
            <mimNumber>606530</mimNumber>
            <phenotype>Cerebrotendinous xanthomatosis</phenotype>
            <phenotypeMimNumber>213700</phenotypeMimNumber>
            <phenotypeMappingKey>3</phenotypeMappingKey>
            <phenotypeInheritance>Autosomal recessive</phenotypeInheritance>
          </phenotypeMap>
          <phenotypeMap>
            <mimNumber>606530</mimNumber>
            <phenotype>Bile acid synthesis defect &amp; more</phenotype>
            <phenotypeMappingKey>3</phenotypeMappingKey>
          </phenotypeMap>
        </phenotypeMapList>
      </geneMap>
    </entry>
  </entryList>
</omim>"#;

    const TEXT_XML: &str = r#"<omim><entryList><entry>
      <textSectionList><textSection>
        <textSectionName>molecularGenetics</textSectionName>
        <textSectionContent>In patients with CTX, Cali et al. (1991) identified mutations.</textSectionContent>
      </textSection></textSectionList>
    </entry></entryList></omim>"#;

    #[test]
    fn test_phenotype_map_parses_records_in_order() {
        let entries = phenotype_map(GENE_MAP_XML).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].phenotype, "Cerebrotendinous xanthomatosis");
        assert_eq!(entries[0].phenotype_mim_number, "213700");
        assert_eq!(entries[0].phenotype_inheritance, "Autosomal recessive");
        assert_eq!(entries[1].phenotype, "Bile acid synthesis defect & more");
        assert_eq!(entries[1].phenotype_mim_number, "");
    }

    #[test]
    fn test_text_section_found_and_missing() {
        let text = text_section(TEXT_XML, "textSectionContent").unwrap();
        assert_eq!(
            text.as_deref(),
            Some("In patients with CTX, Cali et al. (1991) identified mutations.")
        );
        assert_eq!(text_section(GENE_MAP_XML, "textSectionContent").unwrap(), None);
    }

    #[test]
    fn test_phenotype_markdown_table() {
        let md = phenotypes_to_markdown(&phenotype_map(GENE_MAP_XML).unwrap());
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "| mimNumber | phenotype | phenotypeMimNumber | phenotypeMappingKey | phenotypeInheritance |");
        assert_eq!(lines[1], "| --------- | --------- | ------------------ | ------------------- | -------------------- |");
        assert_eq!(lines[2], "| 606530 | Cerebrotendinous xanthomatosis | 213700 | 3 | Autosomal recessive |");
        assert_eq!(phenotypes_to_markdown(&[]), "");
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(matches!(phenotype_map("<a><b></a>"), Err(VarlensError::Xml(_))));
    }

    #[tokio::test]
    async fn test_entry_requires_key_and_numeric_mim() {
        let client = OmimClient::new(SandboxClient::new().unwrap(), None);
        assert!(matches!(client.entry("138140", "geneMap").await, Err(VarlensError::Config(_))));
        assert!(matches!(client.entry("KRAS", "geneMap").await, Err(VarlensError::InvalidInput(_))));
    }
}
