use crate::error::FigureError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

/// Which upstream qualifier supplies a gene's display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneLabelSource {
    Gene,
    Product,
}

/// One horizontal lane of the figure, a single DNA sequence. Immutable once
/// the figure is built; owned by the Scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceTrack {
    pub accession: String,
    pub name: String,
    pub file_name: String,
    pub length_bp: u64,
}

impl SequenceTrack {
    pub fn new<S: Into<String>>(accession: S, name: S, file_name: S, length_bp: u64) -> Self {
        Self {
            accession: accession.into(),
            name: name.into(),
            file_name: file_name.into(),
            length_bp,
        }
    }
}

/// A gene on one track, rendered as a single arrow polygon. Never mutated
/// after figure build; recoloring goes through its rendered trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub track: usize,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub gene_name: Option<String>,
    pub product: Option<String>,
    pub label_source: GeneLabelSource,
}

impl Gene {
    pub fn validate(&self, tracks: &[SequenceTrack]) -> Result<(), FigureError> {
        let track = tracks.get(self.track).ok_or_else(|| {
            FigureError::invalid_range(format!(
                "Gene references track {} but only {} tracks exist",
                self.track,
                tracks.len()
            ))
        })?;
        if self.start >= self.end {
            return Err(FigureError::invalid_range(format!(
                "Gene range {}..{} is empty or reversed",
                self.start, self.end
            )));
        }
        if self.end > track.length_bp {
            return Err(FigureError::invalid_range(format!(
                "Gene range {}..{} exceeds track '{}' length {}",
                self.start, self.end, track.accession, track.length_bp
            )));
        }
        Ok(())
    }

    /// Label text per the upstream-chosen source, falling back to the other
    /// qualifier and finally to the coordinate range.
    pub fn label(&self) -> String {
        let (first, second) = match self.label_source {
            GeneLabelSource::Gene => (&self.gene_name, &self.product),
            GeneLabelSource::Product => (&self.product, &self.gene_name),
        };
        for candidate in [first, second] {
            if let Some(text) = candidate {
                if !text.trim().is_empty() {
                    return text.clone();
                }
            }
        }
        format!("{}..{}", self.start, self.end)
    }
}

/// Matched region between two tracks, colored by percent identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomologySegment {
    pub track_a: usize,
    pub start_a: u64,
    pub end_a: u64,
    pub track_b: usize,
    pub start_b: u64,
    pub end_b: u64,
    pub identity: f64,
}

impl HomologySegment {
    pub fn validate(&self, tracks: &[SequenceTrack]) -> Result<(), FigureError> {
        for (track, start, end) in [
            (self.track_a, self.start_a, self.end_a),
            (self.track_b, self.start_b, self.end_b),
        ] {
            let t = tracks.get(track).ok_or_else(|| {
                FigureError::invalid_range(format!(
                    "Homology references track {} but only {} tracks exist",
                    track,
                    tracks.len()
                ))
            })?;
            if start >= end {
                return Err(FigureError::invalid_range(format!(
                    "Homology range {start}..{end} is empty or reversed"
                )));
            }
            if end > t.length_bp {
                return Err(FigureError::invalid_range(format!(
                    "Homology range {start}..{end} exceeds track '{}' length {}",
                    t.accession, t.length_bp
                )));
            }
        }
        if !(0.0..=100.0).contains(&self.identity) {
            return Err(FigureError::invalid_range(format!(
                "Percent identity {} outside [0, 100]",
                self.identity
            )));
        }
        Ok(())
    }

    /// Aligned length on track A, the length the minimum-homology filter
    /// compares against.
    pub fn length(&self) -> u64 {
        self.end_a - self.start_a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn track(len: u64) -> SequenceTrack {
        SequenceTrack::new("NC_000001", "seq", "seq.gb", len)
    }

    fn gene(track: usize, start: u64, end: u64) -> Gene {
        Gene {
            track,
            start,
            end,
            strand: Strand::Forward,
            gene_name: Some("repA".to_string()),
            product: Some("replication protein".to_string()),
            label_source: GeneLabelSource::Gene,
        }
    }

    #[test]
    fn test_gene_validate() {
        let tracks = vec![track(1000)];
        assert!(gene(0, 10, 30).validate(&tracks).is_ok());
        assert_eq!(
            gene(0, 30, 30).validate(&tracks).unwrap_err().kind,
            ErrorKind::InvalidRange
        );
        assert_eq!(
            gene(0, 10, 1001).validate(&tracks).unwrap_err().kind,
            ErrorKind::InvalidRange
        );
        assert_eq!(
            gene(1, 10, 30).validate(&tracks).unwrap_err().kind,
            ErrorKind::InvalidRange
        );
    }

    #[test]
    fn test_gene_label_fallback() {
        let mut g = gene(0, 10, 30);
        assert_eq!(g.label(), "repA");
        g.label_source = GeneLabelSource::Product;
        assert_eq!(g.label(), "replication protein");
        g.product = None;
        assert_eq!(g.label(), "repA");
        g.gene_name = None;
        assert_eq!(g.label(), "10..30");
    }

    #[test]
    fn test_homology_validate() {
        let tracks = vec![track(1000), track(500)];
        let mut h = HomologySegment {
            track_a: 0,
            start_a: 100,
            end_a: 200,
            track_b: 1,
            start_b: 150,
            end_b: 250,
            identity: 87.5,
        };
        assert!(h.validate(&tracks).is_ok());
        assert_eq!(h.length(), 100);

        h.identity = 105.0;
        assert_eq!(h.validate(&tracks).unwrap_err().kind, ErrorKind::InvalidRange);
        h.identity = 87.5;
        h.end_b = 501;
        assert_eq!(h.validate(&tracks).unwrap_err().kind, ErrorKind::InvalidRange);
    }
}
