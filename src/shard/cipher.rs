use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce};
use rand::RngCore;

use crate::error::CipherError;

/// AES-GCM nonce length; every sealed fragment starts with one.
pub const NONCE_SIZE: usize = 12;

type Aes192Gcm = AesGcm<Aes192, U12>;

/// The symmetric key shared by every node of the cluster.
#[derive(Clone, PartialEq, Eq)]
pub struct ClusterSecret(Vec<u8>);

impl ClusterSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn is_valid_length(&self) -> bool {
        matches!(self.0.len(), 16 | 24 | 32)
    }
}

impl std::fmt::Debug for ClusterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterSecret")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

/// AES-GCM instance sized by the secret: 16, 24 or 32 bytes.
enum FragmentCipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

impl FragmentCipher {
    fn new(secret: &ClusterSecret) -> Result<Self, CipherError> {
        let key = secret.0.as_slice();
        let len = key.len();

        let cipher = match len {
            16 => Aes128Gcm::new_from_slice(key).map(Self::Aes128),
            24 => Aes192Gcm::new_from_slice(key).map(Self::Aes192),
            32 => Aes256Gcm::new_from_slice(key).map(Self::Aes256),
            _ => return Err(CipherError::InvalidKeyLength { len }),
        };
        cipher.map_err(|_| CipherError::InvalidKeyLength { len })
    }

    fn seal(&self, nonce: &Nonce<U12>, plaintext: &[u8]) -> Result<Vec<u8>, aes_gcm::Error> {
        match self {
            Self::Aes128(c) => c.encrypt(nonce, plaintext),
            Self::Aes192(c) => c.encrypt(nonce, plaintext),
            Self::Aes256(c) => c.encrypt(nonce, plaintext),
        }
    }

    fn open(&self, nonce: &Nonce<U12>, sealed: &[u8]) -> Result<Vec<u8>, aes_gcm::Error> {
        match self {
            Self::Aes128(c) => c.decrypt(nonce, sealed),
            Self::Aes192(c) => c.decrypt(nonce, sealed),
            Self::Aes256(c) => c.decrypt(nonce, sealed),
        }
    }
}

/// Seals one fragment: `nonce || ciphertext || tag`, with a fresh random nonce
/// per call.
pub fn encrypt(plaintext: &[u8], secret: &ClusterSecret) -> Result<Vec<u8>, CipherError> {
    let cipher = FragmentCipher::new(secret)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::<U12>::from_slice(&nonce_bytes);

    let sealed = cipher
        .seal(nonce, plaintext)
        .map_err(|_| CipherError::EncryptionFailure)?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + sealed.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&sealed);
    Ok(blob)
}

/// Opens a blob produced by [`encrypt`].
pub fn decrypt(blob: &[u8], secret: &ClusterSecret) -> Result<Vec<u8>, CipherError> {
    let cipher = FragmentCipher::new(secret)?;

    if blob.len() < NONCE_SIZE {
        return Err(CipherError::CiphertextTooShort {
            len: blob.len(),
            min: NONCE_SIZE,
        });
    }

    let (nonce_bytes, sealed) = blob.split_at(NONCE_SIZE);
    cipher
        .open(Nonce::<U12>::from_slice(nonce_bytes), sealed)
        .map_err(|_| CipherError::AuthenticationFailed)
}
