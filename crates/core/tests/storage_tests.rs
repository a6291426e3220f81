// ═══════════════════════════════════════════════════════════════════
// Storage Tests — key/value stores, StorageManager, encrypted backups
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use student_bank_core::errors::CoreError;
use student_bank_core::models::account::{CustomAccount, StudentAccount};
use student_bank_core::models::bank::BankState;
use student_bank_core::models::session::{Role, Session};
use student_bank_core::models::transaction::{Transaction, TransactionType};
use student_bank_core::storage::encryption::{self, KdfParams};
use student_bank_core::storage::format::{self, BackupHeader, CURRENT_VERSION, HEADER_LEN, MAGIC};
use student_bank_core::storage::manager::{
    StorageManager, ADMIN_FLAG_KEY, CUSTOM_ACCOUNTS_KEY, STUDENTS_KEY, USER_ROLE_KEY,
};
use student_bank_core::storage::store::{FileStore, KeyValueStore, MemoryStore};

fn fast_kdf() -> KdfParams {
    KdfParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

fn sample_state() -> BankState {
    let created = NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let mut asha = StudentAccount::new("Asha", "asha", "pw1", created);
    asha.balance = 70.0;
    asha.transactions = vec![
        Transaction::new(TransactionType::Deposit, 100.0, created),
        Transaction::with_reason(TransactionType::Withdraw, 30.0, created, "Books"),
    ];
    let custom = CustomAccount::for_student(&asha);
    BankState {
        students: vec![asha],
        custom_accounts: vec![custom],
        session: Session {
            is_admin_authenticated: true,
            user_role: Some(Role::Admin),
            username: Some("admin".into()),
        },
        tickets: vec![],
    }
}

// ═══════════════════════════════════════════════════════════════════
// MemoryStore
// ═══════════════════════════════════════════════════════════════════

mod memory_store {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut s = MemoryStore::new();
        assert_eq!(s.get("students").unwrap(), None);
        s.set("students", "[]").unwrap();
        assert_eq!(s.get("students").unwrap().as_deref(), Some("[]"));
        assert!(s.remove("students").unwrap());
        assert!(!s.remove("students").unwrap());
    }

    #[test]
    fn keys_are_sorted() {
        let mut s = MemoryStore::new();
        s.set("userRole", "admin").unwrap();
        s.set("customAccounts", "[]").unwrap();
        assert_eq!(s.keys().unwrap(), vec!["customAccounts", "userRole"]);
    }

    #[test]
    fn bytes_used_counts_keys_and_values() {
        let mut s = MemoryStore::new();
        s.set("ab", "1234").unwrap();
        assert_eq!(s.bytes_used().unwrap(), 6);
    }
}

// ═══════════════════════════════════════════════════════════════════
// FileStore
// ═══════════════════════════════════════════════════════════════════

mod file_store {
    use super::*;

    #[test]
    fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut s = FileStore::open(dir.path()).unwrap();
            s.set("students", "[1]").unwrap();
        }
        let s = FileStore::open(dir.path()).unwrap();
        assert_eq!(s.get("students").unwrap().as_deref(), Some("[1]"));
        assert_eq!(s.keys().unwrap(), vec!["students"]);
    }

    #[test]
    fn missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStore::open(dir.path()).unwrap();
        assert_eq!(s.get("nothing").unwrap(), None);
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = FileStore::open(dir.path()).unwrap();
        assert!(matches!(s.set("../evil", "x"), Err(CoreError::Storage(_))));
        assert!(matches!(s.get(""), Err(CoreError::Storage(_))));
    }

    #[test]
    fn remove_reports_existence() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = FileStore::open(dir.path()).unwrap();
        s.set("userRole", "admin").unwrap();
        assert!(s.remove("userRole").unwrap());
        assert!(!s.remove("userRole").unwrap());
        assert!(s.keys().unwrap().is_empty());
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let s = FileStore::open(&nested).unwrap();
        assert!(s.dir().exists());
    }
}

// ═══════════════════════════════════════════════════════════════════
// StorageManager
// ═══════════════════════════════════════════════════════════════════

mod manager {
    use super::*;

    #[test]
    fn empty_store_loads_default_state() {
        let store = MemoryStore::new();
        let state = StorageManager::load_state(&store).unwrap();
        assert_eq!(state, BankState::default());
    }

    #[test]
    fn save_then_load_state() {
        let mut store = MemoryStore::new();
        let state = sample_state();
        StorageManager::save_state(&mut store, &state).unwrap();
        let loaded = StorageManager::load_state(&store).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn session_flags_are_plain_strings() {
        let mut store = MemoryStore::new();
        StorageManager::save_state(&mut store, &sample_state()).unwrap();
        assert_eq!(store.get(ADMIN_FLAG_KEY).unwrap().as_deref(), Some("true"));
        assert_eq!(store.get(USER_ROLE_KEY).unwrap().as_deref(), Some("admin"));
    }

    #[test]
    fn logged_out_session_removes_keys() {
        let mut store = MemoryStore::new();
        StorageManager::save_state(&mut store, &sample_state()).unwrap();
        StorageManager::save_session(&mut store, &Session::default()).unwrap();
        assert_eq!(store.get(ADMIN_FLAG_KEY).unwrap(), None);
        assert_eq!(store.get(USER_ROLE_KEY).unwrap(), None);
    }

    #[test]
    fn unknown_role_is_ignored() {
        let mut store = MemoryStore::new();
        store.set(USER_ROLE_KEY, "superuser").unwrap();
        let session = StorageManager::load_session(&store).unwrap();
        assert_eq!(session.user_role, None);
    }

    #[test]
    fn students_are_a_json_array() {
        let mut store = MemoryStore::new();
        StorageManager::save_state(&mut store, &sample_state()).unwrap();
        let raw = store.get(STUDENTS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["username"], "asha");
        assert_eq!(value[0]["transactions"][1]["type"], "withdraw");
    }

    #[test]
    fn corrupt_json_is_an_error() {
        let mut store = MemoryStore::new();
        store.set(CUSTOM_ACCOUNTS_KEY, "{not json").unwrap();
        let err = StorageManager::load_state(&store).unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(ref m) if m.contains("customAccounts")));
    }

    #[test]
    fn blank_value_loads_as_empty() {
        let mut store = MemoryStore::new();
        store.set(STUDENTS_KEY, "  ").unwrap();
        let students: Vec<StudentAccount> = StorageManager::load_json(&store, STUDENTS_KEY).unwrap();
        assert!(students.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Encryption & backup format
// ═══════════════════════════════════════════════════════════════════

mod backup {
    use super::*;

    #[test]
    fn roundtrip_restores_identical_state() {
        let state = sample_state();
        let bytes = StorageManager::backup_to_bytes_with_params(&state, "s3cret", fast_kdf()).unwrap();
        assert_eq!(&bytes[..4], MAGIC);
        let restored = StorageManager::restore_from_bytes(&bytes, "s3cret").unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn wrong_password_fails_with_decryption() {
        let bytes =
            StorageManager::backup_to_bytes_with_params(&sample_state(), "right", fast_kdf()).unwrap();
        let err = StorageManager::restore_from_bytes(&bytes, "wrong").unwrap_err();
        assert!(matches!(err, CoreError::Decryption));
    }

    #[test]
    fn two_backups_differ() {
        let state = sample_state();
        let a = StorageManager::backup_to_bytes_with_params(&state, "pw", fast_kdf()).unwrap();
        let b = StorageManager::backup_to_bytes_with_params(&state, "pw", fast_kdf()).unwrap();
        assert_ne!(a, b, "fresh salt and nonce per backup");
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let mut bytes =
            StorageManager::backup_to_bytes_with_params(&sample_state(), "pw", fast_kdf()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(matches!(
            StorageManager::restore_from_bytes(&bytes, "pw"),
            Err(CoreError::Decryption)
        ));
    }

    #[test]
    fn out_of_range_kdf_params_rejected_on_write() {
        let params = KdfParams {
            memory_cost: 1024,
            time_cost: 0,
            parallelism: 1,
        };
        assert!(StorageManager::backup_to_bytes_with_params(&sample_state(), "pw", params).is_err());
    }

    #[test]
    fn short_input_is_invalid_format() {
        let err = format::decode(b"JDSB").unwrap_err();
        assert!(matches!(err, CoreError::InvalidFileFormat(_)));
    }

    #[test]
    fn wrong_magic_is_invalid_format() {
        let mut data = vec![0u8; HEADER_LEN];
        data[..4].copy_from_slice(b"SVTK");
        assert!(matches!(format::decode(&data), Err(CoreError::InvalidFileFormat(_))));
    }

    #[test]
    fn future_version_is_unsupported() {
        let header = BackupHeader {
            version: CURRENT_VERSION + 1,
            kdf_params: fast_kdf(),
            salt: [1; 16],
            nonce: [2; 12],
        };
        let data = format::encode(&header, b"xyz");
        assert!(matches!(
            format::decode(&data),
            Err(CoreError::UnsupportedVersion(v)) if v == CURRENT_VERSION + 1
        ));
    }

    #[test]
    fn truncated_ciphertext_is_detected() {
        let header = BackupHeader {
            version: CURRENT_VERSION,
            kdf_params: fast_kdf(),
            salt: [1; 16],
            nonce: [2; 12],
        };
        let mut data = format::encode(&header, &[9u8; 32]);
        data.truncate(data.len() - 5);
        assert!(matches!(format::decode(&data), Err(CoreError::InvalidFileFormat(_))));
    }

    #[test]
    fn encode_decode_header() {
        let header = BackupHeader {
            version: CURRENT_VERSION,
            kdf_params: fast_kdf(),
            salt: [7; 16],
            nonce: [8; 12],
        };
        let data = format::encode(&header, b"cipher");
        assert_eq!(data.len(), HEADER_LEN + 6);
        let (decoded, ct) = format::decode(&data).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(ct, b"cipher");
    }

    #[test]
    fn seal_and_open() {
        let salt = [3u8; 16];
        let key = encryption::derive_key("pw", &salt, &fast_kdf()).unwrap();
        let (nonce, sealed) = encryption::seal(b"hello", &key).unwrap();
        assert_eq!(encryption::open(&sealed, &key, &nonce).unwrap(), b"hello");
    }

    #[test]
    fn derive_key_is_deterministic() {
        let salt = [4u8; 16];
        let a = encryption::derive_key("pw", &salt, &fast_kdf()).unwrap();
        let b = encryption::derive_key("pw", &salt, &fast_kdf()).unwrap();
        let c = encryption::derive_key("other", &salt, &fast_kdf()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
