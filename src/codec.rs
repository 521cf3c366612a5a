use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// File formats for pool snapshots, batches and transactions.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Format {
    Json,
    Bincode,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "bincode" | "bin" => Ok(Self::Bincode),
            unknown => Err(format!("Unknown Format: {}", unknown)),
        }
    }
}

impl Format {
    /// `.json` files are JSON, everything else is bincode.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Bincode,
        }
    }
}

pub fn encode<T: Serialize>(format: Format, value: &T) -> Result<Vec<u8>, String> {
    match format {
        Format::Json => serde_json::to_vec_pretty(value).map_err(|e| e.to_string()),
        Format::Bincode => bincode::serialize(value).map_err(|e| e.to_string()),
    }
}

pub fn decode<T: DeserializeOwned>(format: Format, bytes: &[u8]) -> Result<T, String> {
    match format {
        Format::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
        Format::Bincode => bincode::deserialize(bytes).map_err(|e| e.to_string()),
    }
}

/// Reads the file, inferring the format from its extension unless one is given.
pub fn load<T: DeserializeOwned>(path: &Path, format: Option<Format>) -> Result<T, String> {
    let format = format.unwrap_or_else(|| Format::from_path(path));
    let bytes = fs::read(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    decode(format, &bytes).map_err(|e| format!("Failed to decode {}: {}", path.display(), e))
}

pub fn save<T: Serialize>(path: &Path, format: Option<Format>, value: &T) -> Result<(), String> {
    let format = format.unwrap_or_else(|| Format::from_path(path));
    let bytes = encode(format, value)?;
    fs::write(path, bytes).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Coin, KeyPair, OutputIndex, Sha256, Transaction, TransactionBuilder, TransactionId,
        TransactionOutput, Utxo, UtxoPool,
    };

    fn pool_and_batch() -> (UtxoPool, Vec<Transaction>) {
        let alice = KeyPair::from_seed([1; 32]);
        let bob = KeyPair::from_seed([2; 32]);
        let u1 = Utxo::new(
            TransactionId::new(Sha256::digest(b"genesis")),
            OutputIndex::new(0),
        );
        let mut pool = UtxoPool::new();
        pool.add_utxo(u1, TransactionOutput::new(Coin::new(10), alice.address()));

        let mut builder = TransactionBuilder::new();
        builder
            .add_input(*u1.transaction_id(), u1.output_index())
            .add_output(Coin::new(4), bob.address())
            .add_output(Coin::new(6), alice.address());
        builder.sign_input(0, &alice).unwrap();
        (pool, vec![builder.build()])
    }

    #[test]
    fn json_and_bincode_preserve_pool_and_batch() {
        let (pool, batch) = pool_and_batch();
        for format in [Format::Json, Format::Bincode].iter() {
            let decoded_pool: UtxoPool = decode(*format, &encode(*format, &pool).unwrap()).unwrap();
            assert_eq!(decoded_pool, pool);

            let decoded_batch: Vec<Transaction> =
                decode(*format, &encode(*format, &batch).unwrap()).unwrap();
            assert_eq!(decoded_batch, batch);
        }
    }

    #[test]
    fn json_uses_hex_strings() {
        let (pool, _) = pool_and_batch();
        let json = String::from_utf8(encode(Format::Json, &pool).unwrap()).unwrap();
        let id = TransactionId::new(Sha256::digest(b"genesis"));
        assert!(json.contains(&format!("\"{}\"", id)));
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(decode::<UtxoPool>(Format::Json, b"{").is_err());
        assert!(decode::<UtxoPool>(Format::Bincode, &[1, 2, 3]).is_err());
    }

    #[test]
    fn save_then_load_infers_format_from_extension() {
        let (pool, batch) = pool_and_batch();
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("pool.json");
        save(&json_path, None, &pool).unwrap();
        assert!(fs::read_to_string(&json_path).unwrap().starts_with('['));
        assert_eq!(load::<UtxoPool>(&json_path, None).unwrap(), pool);

        let bincode_path = dir.path().join("batch.dat");
        save(&bincode_path, None, &batch).unwrap();
        assert!(decode::<Vec<Transaction>>(Format::Json, &fs::read(&bincode_path).unwrap()).is_err());
        assert_eq!(load::<Vec<Transaction>>(&bincode_path, None).unwrap(), batch);

        let forced_path = dir.path().join("pool.dat");
        save(&forced_path, Some(Format::Json), &pool).unwrap();
        assert_eq!(load::<UtxoPool>(&forced_path, Some(Format::Json)).unwrap(), pool);
        assert!(load::<UtxoPool>(&dir.path().join("missing.json"), None).is_err());
    }

    #[test]
    fn format_from_str_and_path() {
        assert_eq!("JSON".parse(), Ok(Format::Json));
        assert_eq!("bin".parse(), Ok(Format::Bincode));
        assert!("xml".parse::<Format>().is_err());
        assert_eq!(Format::from_path(Path::new("pool.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("pool.dat")), Format::Bincode);
    }
}
