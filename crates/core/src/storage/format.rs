use super::encryption::{KdfParams, NONCE_LEN, SALT_LEN};
use crate::errors::CoreError;

/// Magic bytes of a JDSA student-bank backup.
pub const MAGIC: &[u8; 4] = b"JDSB";

pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf(12) + salt(16) + nonce(12) + length(8)
pub const HEADER_LEN: usize = 4 + 2 + 12 + SALT_LEN + NONCE_LEN + 8;

/// Header of an encrypted backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupHeader {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
}

/// Serialize header and ciphertext. All integers little-endian:
///
/// ```text
/// JDSB | version u16 | memory u32 | time u32 | lanes u32
///      | salt [16] | nonce [12] | ciphertext_len u64 | ciphertext
/// ```
pub fn encode(header: &BackupHeader, ciphertext: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&header.version.to_le_bytes());
    for v in [
        header.kdf_params.memory_cost,
        header.kdf_params.time_cost,
        header.kdf_params.parallelism,
    ] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&header.salt);
    out.extend_from_slice(&header.nonce);
    out.extend_from_slice(&(ciphertext.len() as u64).to_le_bytes());
    out.extend_from_slice(ciphertext);
    out
}

/// Parse a backup into its header and ciphertext. Trailing bytes after the
/// declared ciphertext are ignored.
pub fn decode(data: &[u8]) -> Result<(BackupHeader, &[u8]), CoreError> {
    if data.len() < HEADER_LEN {
        return Err(CoreError::InvalidFileFormat(format!(
            "Backup too short: {} bytes",
            data.len()
        )));
    }

    let mut r = Reader { data, pos: 0 };
    if r.array::<4>()? != *MAGIC {
        return Err(CoreError::InvalidFileFormat("Not a JDSB backup".into()));
    }

    let version = u16::from_le_bytes(r.array()?);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let kdf_params = KdfParams {
        memory_cost: u32::from_le_bytes(r.array()?),
        time_cost: u32::from_le_bytes(r.array()?),
        parallelism: u32::from_le_bytes(r.array()?),
    };
    kdf_params.check_bounds()?;

    let salt = r.array::<SALT_LEN>()?;
    let nonce = r.array::<NONCE_LEN>()?;
    let len = u64::from_le_bytes(r.array()?);
    let len = usize::try_from(len)
        .map_err(|_| CoreError::InvalidFileFormat("Ciphertext length overflow".into()))?;
    let ciphertext = r.take(len)?;

    Ok((
        BackupHeader {
            version,
            kdf_params,
            salt,
            nonce,
        },
        ciphertext,
    ))
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CoreError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                CoreError::InvalidFileFormat(format!(
                    "Backup truncated: wanted {n} bytes at offset {}",
                    self.pos
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}
