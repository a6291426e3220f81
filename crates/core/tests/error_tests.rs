// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use student_bank_core::errors::CoreError;
use student_bank_core::models::settings::Settings;

mod display {
    use super::*;

    #[test]
    fn invalid_amount_is_user_facing() {
        assert_eq!(CoreError::InvalidAmount.to_string(), "Please enter a valid amount");
    }

    #[test]
    fn no_student_selected_is_user_facing() {
        assert_eq!(CoreError::NoStudentSelected.to_string(), "Please select a student");
    }

    #[test]
    fn insufficient_balance_shows_both_amounts() {
        let err = CoreError::InsufficientBalance {
            requested: 150.0,
            available: 100.5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: requested 150.00, available 100.50"
        );
    }

    #[test]
    fn validation_message_is_passed_through() {
        let err = CoreError::Validation("Name is required".into());
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn account_not_found() {
        let err = CoreError::AccountNotFound("ravi".into());
        assert_eq!(err.to_string(), "Account not found: ravi");
    }

    #[test]
    fn duplicate_username() {
        let err = CoreError::DuplicateUsername("ravi".into());
        assert_eq!(err.to_string(), "Username already exists: ravi");
    }

    #[test]
    fn api_error_names_service() {
        let err = CoreError::Api {
            service: "chat-completions".into(),
            message: "HTTP 500".into(),
        };
        assert_eq!(err.to_string(), "Service error (chat-completions): HTTP 500");
    }

    #[test]
    fn unsupported_version() {
        assert_eq!(
            CoreError::UnsupportedVersion(7).to_string(),
            "Unsupported backup version: 7"
        );
    }

    #[test]
    fn decryption() {
        assert_eq!(
            CoreError::Decryption.to_string(),
            "Decryption failed — wrong password or corrupted backup"
        );
    }

    #[test]
    fn auth_errors() {
        assert_eq!(CoreError::Unauthorized.to_string(), "Admin login required");
        assert_eq!(
            CoreError::InvalidCredentials.to_string(),
            "Invalid username or password"
        );
    }
}

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::Storage(ref m) if m.contains("denied")));
    }

    #[test]
    fn bad_settings_json_is_deserialization() {
        let err = Settings::from_json("not json").unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(ref m) if m.contains("settings")));
    }

    #[test]
    fn from_bincode_error() {
        let bin_err = bincode::deserialize::<String>(&[0xff]).unwrap_err();
        let err: CoreError = bin_err.into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn from_aes_error_is_decryption() {
        let err: CoreError = aes_gcm::Error.into();
        assert!(matches!(err, CoreError::Decryption));
    }

    #[test]
    fn errors_are_debug_and_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        let err = CoreError::InvalidAmount;
        assert_error(&err);
        assert!(format!("{err:?}").contains("InvalidAmount"));
    }
}
