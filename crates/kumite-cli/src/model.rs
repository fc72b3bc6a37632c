use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use kumite_brain::GenomePayload;
use serde::{Deserialize, Serialize};

/// A trained fighter model on disk: the genome payload plus metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FighterModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub genome: GenomePayload,
}

impl FighterModel {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open fighter model file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let model = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to read fighter model file: {}", path.display()))?;
        Ok(model)
    }

    pub fn save<P>(&self, path: P) -> anyhow::Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create fighter model file: {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .with_context(|| format!("Failed to write fighter model file: {}", path.display()))?;
        Ok(())
    }
}
