//! Unit tests for identifiers and document numbering
//!
//! Tests cover identifier creation, parsing and display, and the
//! `PFX-YYYY-MM-NNNN` document number format.

use core_kernel::{
    ClaimId, ClientId, CoverageId, DocumentKind, DocumentNumber, NumberingError, NumberingPeriod,
    PolicyId, QuoteId, ThirdPartyId,
};
use uuid::Uuid;

mod identifier_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(PolicyId::new(), PolicyId::new());
        assert_ne!(ClaimId::new_v7(), ClaimId::new_v7());
    }

    #[test]
    fn test_display_carries_prefix() {
        let uuid = Uuid::nil();
        assert_eq!(
            QuoteId::from_uuid(uuid).to_string(),
            "QUO-00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(CoverageId::prefix(), "COV");
        assert_eq!(ThirdPartyId::prefix(), "TPY");
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        let id = ClientId::new();
        let with_prefix: ClientId = id.to_string().parse().unwrap();
        let bare: ClientId = id.as_uuid().to_string().parse().unwrap();
        assert_eq!(with_prefix, id);
        assert_eq!(bare, id);
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!("CLI-not-a-uuid".parse::<ClientId>().is_err());
    }

    #[test]
    fn test_uuid_conversions() {
        let uuid = Uuid::new_v4();
        let id = PolicyId::from(uuid);
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn test_serializes_as_bare_uuid() {
        let id = ClaimId::from_uuid(Uuid::nil());
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"00000000-0000-0000-0000-000000000000\""
        );
    }

    #[test]
    fn test_v7_ids_are_time_ordered() {
        let first = ClaimId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = ClaimId::new_v7();
        assert!(first < second);
    }
}

mod numbering_tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(DocumentKind::Quote.prefix(), "QTE");
        assert_eq!(DocumentKind::Policy.prefix(), "POL");
        assert_eq!(DocumentKind::Endorsement.prefix(), "AVE");
        assert_eq!(DocumentKind::Claim.prefix(), "SIN");
    }

    #[test]
    fn test_format_round_trip() {
        let number = DocumentNumber::new(DocumentKind::Policy, NumberingPeriod::new(2025, 6).unwrap(), 50);
        assert_eq!(number.to_string(), "POL-2025-06-0050");
        assert_eq!("POL-2025-06-0050".parse::<DocumentNumber>().unwrap(), number);
    }

    #[test]
    fn test_invalid_month() {
        assert_eq!(NumberingPeriod::new(2025, 0), Err(NumberingError::InvalidMonth(0)));
        assert!(matches!(
            "SIN-2025-00-0001".parse::<DocumentNumber>(),
            Err(NumberingError::InvalidMonth(0))
        ));
    }

    #[test]
    fn test_malformed_numbers() {
        for input in ["", "SIN", "SIN-2025-03", "SIN-2025-03-0001-9", "sin-2025-03-0001", "SIN-25-x-1"] {
            assert!(
                input.parse::<DocumentNumber>().is_err(),
                "{} should not parse",
                input
            );
        }
    }

    #[test]
    fn test_period_display() {
        assert_eq!(NumberingPeriod::new(2025, 3).unwrap().to_string(), "2025-03");
    }
}
