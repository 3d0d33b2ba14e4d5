use anyhow::Result;
use std::path::Path;

/// Reads a program binary, optionally dropping `skip` leading bytes and
/// keeping at most `len` bytes after that.
pub fn load_raw_bin(path: &Path, skip: usize, len: Option<usize>) -> Result<Vec<u8>> {
    let file = std::fs::read(path)?;
    anyhow::ensure!(skip <= file.len(), "--skip exceeds file size");
    let mut payload = &file[skip..];
    if let Some(lim) = len {
        anyhow::ensure!(lim <= payload.len(), "--len exceeds remaining file size after skip");
        payload = &payload[..lim];
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_applies_skip_and_len() {
        let path = std::env::temp_dir().join(format!("uvm_asm_loader_{}.bin", std::process::id()));
        std::fs::write(&path, [0u8, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(load_raw_bin(&path, 2, Some(3)).unwrap(), vec![2, 3, 4]);
        assert_eq!(load_raw_bin(&path, 0, None).unwrap().len(), 6);
        assert!(load_raw_bin(&path, 7, None).is_err());
        assert!(load_raw_bin(&path, 4, Some(3)).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
