use crate::error::GeneDiveError;
use crate::interaction::Interaction;
use std::io::Write;

/// Write the filtrate as CSV, one evidence record per row.
pub fn write_filtrate_csv<W: Write>(filtrate: &[Interaction], writer: W) -> Result<(), GeneDiveError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "id1",
        "mention1",
        "id2",
        "mention2",
        "probability",
        "article",
        "section",
        "journal",
        "excerpt",
        "highlighted",
    ])?;
    for interaction in filtrate {
        let probability = interaction.probability.to_string();
        csv.write_record([
            interaction.geneids1.as_str(),
            interaction.mention1.as_str(),
            interaction.geneids2.as_str(),
            interaction.mention2.as_str(),
            probability.as_str(),
            interaction.article_id(),
            interaction.section(),
            interaction.journal(),
            interaction.excerpt(),
            if interaction.highlight { "yes" } else { "no" },
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn filtrate_csv_string(filtrate: &[Interaction]) -> Result<String, GeneDiveError> {
    let mut buffer = Vec::new();
    write_filtrate_csv(filtrate, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn write_filtrate_csv_file(filtrate: &[Interaction], path: &str) -> Result<(), GeneDiveError> {
    let file = std::fs::File::create(path)?;
    write_filtrate_csv(filtrate, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_has_header_and_rows() {
        let mut i = Interaction {
            geneids1: "1".to_string(),
            mention1: "BRCA1".to_string(),
            geneids2: "2".to_string(),
            mention2: "TP53".to_string(),
            probability: 0.85,
            pubmed_id: Some("123".to_string()),
            section: Some("results".to_string()),
            ..Default::default()
        };
        i.normalize();
        let csv = filtrate_csv_string(&[i]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id1,mention1,id2"));
        assert!(lines[1].contains("BRCA1"));
        assert!(lines[1].contains("0.85"));
        assert!(lines[1].ends_with(",no"));
    }

    #[test]
    fn test_empty_filtrate_is_header_only() {
        let csv = filtrate_csv_string(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_write_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtrate.csv");
        write_filtrate_csv_file(&[], path.to_str().unwrap()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("id1,mention1"));
    }
}
