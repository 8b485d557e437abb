//! Claim Service Tests
//!
//! Drives `ClaimService` against policies issued through the shared
//! `TestHarness`, covering declaration guards, the adjudication workflow,
//! third parties, documents and the audit trail.

use chrono::Duration;
use rust_decimal_macros::dec;

use core_kernel::{ErrorKind, PolicyId};
use domain_claims::{
    Approval, ClaimError, ClaimStatus, ClaimUpdate, ExpertAssignment, Expertise, HistoryAction,
    MotorClaimDetails, MotorClaimType, NewDocument, Settlement, ThirdPartyDetails,
};
use test_utils::{
    assert_amount, assert_error_kind, ClaimRequestBuilder, MoneyFixtures, TemporalFixtures,
    TestHarness,
};

const HANDLER: Option<&str> = Some("k.kouassi");

fn expert() -> ExpertAssignment {
    ExpertAssignment {
        expert_name: "Cabinet Expertise Auto CI".to_string(),
        expertise_date: TemporalFixtures::date(2025, 6, 25),
        notes: None,
    }
}

fn approval(amount: rust_decimal::Decimal, deductible: rust_decimal::Decimal) -> Approval {
    Approval {
        approved_amount: MoneyFixtures::xof(amount),
        deductible: MoneyFixtures::xof(deductible),
        comments: Some("Conforme au rapport".to_string()),
    }
}

fn settlement() -> Settlement {
    Settlement {
        payment_reference: "VIR-2025-0612".to_string(),
        payment_method: "Virement".to_string(),
        settlement_date: TemporalFixtures::date(2025, 7, 15),
        comments: None,
    }
}

fn constat() -> NewDocument {
    NewDocument {
        document_type: "CONSTAT".to_string(),
        file_name: "constat_amiable.pdf".to_string(),
        file_path: "claims/constat_amiable.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        file_size: 245_760,
        description: Some("Constat signé par les deux parties".to_string()),
    }
}

async fn draft_claim(h: &TestHarness) -> domain_claims::Claim {
    let policy = h.active_policy(&["SECTION_B"]).await;
    h.claim_service
        .create(ClaimRequestBuilder::new(policy.id()).build(), HANDLER)
        .await
        .unwrap()
}

// ============= DECLARATION =============
mod declaration_tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_opens_as_draft_with_number() {
        let h = TestHarness::new().await;
        let policy = h.active_policy(&["SECTION_B"]).await;

        let claim = h
            .claim_service
            .create(
                ClaimRequestBuilder::new(policy.id())
                    .police_report("PV-4512", "Commissariat du 8e")
                    .injuries(1)
                    .build(),
                HANDLER,
            )
            .await
            .unwrap();

        assert_eq!(claim.status(), ClaimStatus::Draft);
        assert_eq!(claim.claim_number().to_string(), "SIN-2025-03-0001");
        assert_eq!(claim.policy_number(), policy.policy_number().to_string());
        assert_eq!(claim.client_id(), h.client_id);
        assert_eq!(claim.reported_date(), h.now());
        assert_eq!(claim.history().len(), 1);
        assert_eq!(claim.history()[0].action_type, HistoryAction::ClaimCreated);
        assert_eq!(claim.history()[0].performed_by.as_deref(), Some("k.kouassi"));
    }

    #[tokio::test]
    async fn test_claim_outside_coverage_period_is_rejected() {
        let h = TestHarness::new().await;
        let policy = h.active_policy(&[]).await;
        let request = ClaimRequestBuilder::new(policy.id())
            .claim_date(TemporalFixtures::date(2026, 4, 1))
            .build();

        let error = h.claim_service.create(request, HANDLER).await.unwrap_err();
        assert_error_kind(error.kind(), ErrorKind::InvariantViolation);
        assert!(error.to_string().contains("out of coverage period"));
        assert!(h.claims.is_empty().await);
    }

    #[tokio::test]
    async fn test_claim_on_draft_policy_is_rejected() {
        let h = TestHarness::new().await;
        let policy = h.issue_policy(&[]).await;

        let error = h
            .claim_service
            .create(ClaimRequestBuilder::new(policy.id()).build(), None)
            .await
            .unwrap_err();
        assert!(matches!(error, ClaimError::PolicyNotActive(_)));
        assert_error_kind(error.kind(), ErrorKind::InvariantViolation);
    }

    #[tokio::test]
    async fn test_rejected_declaration_consumes_no_number() {
        let h = TestHarness::new().await;
        let policy = h.active_policy(&[]).await;
        let outside = ClaimRequestBuilder::new(policy.id())
            .claim_date(TemporalFixtures::date(2024, 12, 31))
            .build();
        h.claim_service.create(outside, None).await.unwrap_err();

        let claim = h
            .claim_service
            .create(ClaimRequestBuilder::new(policy.id()).build(), None)
            .await
            .unwrap();
        assert_eq!(claim.claim_number().to_string(), "SIN-2025-03-0001");
    }

    #[tokio::test]
    async fn test_unknown_policy_is_not_found() {
        let h = TestHarness::new().await;

        let error = h
            .claim_service
            .create(ClaimRequestBuilder::new(PolicyId::new()).build(), None)
            .await
            .unwrap_err();
        assert_error_kind(error.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_negative_claimed_amount_is_rejected() {
        let h = TestHarness::new().await;
        let policy = h.active_policy(&[]).await;
        let request = ClaimRequestBuilder::new(policy.id())
            .claimed_amount(MoneyFixtures::xof(dec!(-1)))
            .build();

        let error = h.claim_service.create(request, None).await.unwrap_err();
        assert_error_kind(error.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_initial_third_parties_are_stored() {
        let h = TestHarness::new().await;
        let policy = h.active_policy(&[]).await;
        let request = ClaimRequestBuilder::new(policy.id())
            .third_party(ThirdPartyDetails::new("Awa Traoré").at_fault(dec!(100)))
            .build();

        let claim = h.claim_service.create(request, None).await.unwrap();
        assert_eq!(claim.third_parties().len(), 1);
        assert!(claim.third_parties()[0].details.is_at_fault);
    }

    #[tokio::test]
    async fn test_fault_percentage_over_hundred_is_rejected() {
        let h = TestHarness::new().await;
        let policy = h.active_policy(&[]).await;
        let request = ClaimRequestBuilder::new(policy.id())
            .third_party(ThirdPartyDetails::new("Yao Konan").at_fault(dec!(120)))
            .build();

        let error = h.claim_service.create(request, None).await.unwrap_err();
        assert_error_kind(error.kind(), ErrorKind::Validation);
    }
}

// ============= WORKFLOW =============
mod workflow_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_adjudication_path() {
        let h = TestHarness::new().await;
        let claim = draft_claim(&h).await;
        let id = claim.id();

        h.claim_service.submit(id, HANDLER).await.unwrap();
        h.claim_service.start_review(id, HANDLER).await.unwrap();
        let investigating = h.claim_service.assign_expert(id, expert(), HANDLER).await.unwrap();
        assert_eq!(investigating.status(), ClaimStatus::Investigating);
        assert_eq!(investigating.assigned_expert(), Some("Cabinet Expertise Auto CI"));

        let assessed = h
            .claim_service
            .submit_expertise(
                id,
                Expertise {
                    estimated_amount: MoneyFixtures::xof(dec!(780000)),
                    report: "Choc avant droit, pare-chocs et optique".to_string(),
                    recommended_deductible: Some(MoneyFixtures::xof(dec!(50000))),
                },
                HANDLER,
            )
            .await
            .unwrap();
        assert_eq!(assessed.status(), ClaimStatus::Investigating);
        assert_amount(&assessed.estimated_amount().unwrap(), dec!(780000));

        let approved = h
            .claim_service
            .approve(id, approval(dec!(750000), dec!(50000)), HANDLER)
            .await
            .unwrap();
        assert_eq!(approved.status(), ClaimStatus::Approved);
        assert_amount(&approved.net_payable_amount().unwrap(), dec!(700000));
        assert_eq!(approved.approved_by(), Some("k.kouassi"));
        assert_eq!(approved.approval_date(), Some(h.now()));

        let settled = h.claim_service.settle(id, settlement(), HANDLER).await.unwrap();
        assert_eq!(settled.status(), ClaimStatus::Settled);
        assert_eq!(settled.payment_reference(), Some("VIR-2025-0612"));

        let closed = h.claim_service.close(id, HANDLER).await.unwrap();
        assert_eq!(closed.status(), ClaimStatus::Closed);
        assert!(closed.closed_date().is_some());
    }

    #[tokio::test]
    async fn test_reject_on_settled_claim_fails() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();
        h.claim_service.submit(id, None).await.unwrap();
        h.claim_service.start_review(id, None).await.unwrap();
        h.claim_service.approve(id, approval(dec!(400000), dec!(0)), None).await.unwrap();
        h.claim_service.settle(id, settlement(), None).await.unwrap();

        let error = h.claim_service.reject(id, "Fraude", None, None).await.unwrap_err();
        assert!(matches!(error, ClaimError::InvalidStatusTransition { .. }));
        assert_error_kind(error.kind(), ErrorKind::InvalidStateTransition);
    }

    #[tokio::test]
    async fn test_reject_on_draft_claim_closes_it() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();

        let rejected = h
            .claim_service
            .reject(id, "Sinistre non garanti", Some("Exclusion conduite sans permis".to_string()), HANDLER)
            .await
            .unwrap();
        assert_eq!(rejected.status(), ClaimStatus::Rejected);
        assert_eq!(rejected.closed_date(), Some(h.now()));
        assert_eq!(rejected.rejection_reason(), Some("Sinistre non garanti"));

        let closed = h.claim_service.close(id, None).await.unwrap();
        assert_eq!(closed.status(), ClaimStatus::Closed);
    }

    #[tokio::test]
    async fn test_approval_requires_review() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();
        h.claim_service.submit(id, None).await.unwrap();

        let error = h
            .claim_service
            .approve(id, approval(dec!(100000), dec!(0)), None)
            .await
            .unwrap_err();
        assert_error_kind(error.kind(), ErrorKind::InvalidStateTransition);
    }

    #[tokio::test]
    async fn test_settling_zero_net_payable_fails() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();
        h.claim_service.submit(id, None).await.unwrap();
        h.claim_service.start_review(id, None).await.unwrap();
        h.claim_service
            .approve(id, approval(dec!(50000), dec!(50000)), None)
            .await
            .unwrap();

        let error = h.claim_service.settle(id, settlement(), None).await.unwrap_err();
        assert!(matches!(error, ClaimError::NothingToSettle));
        let stored = h.claim_service.get_by_id(id).await.unwrap();
        assert_eq!(stored.status(), ClaimStatus::Approved);
    }

    #[tokio::test]
    async fn test_expertise_without_expert_fails() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();
        h.claim_service.submit(id, None).await.unwrap();
        h.claim_service.start_review(id, None).await.unwrap();

        let error = h
            .claim_service
            .submit_expertise(
                id,
                Expertise {
                    estimated_amount: MoneyFixtures::xof(dec!(100000)),
                    report: "n/a".to_string(),
                    recommended_deductible: None,
                },
                None,
            )
            .await
            .unwrap_err();
        assert_error_kind(error.kind(), ErrorKind::InvalidStateTransition);
    }

    #[tokio::test]
    async fn test_closed_claim_cannot_be_closed_again() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();
        h.claim_service.reject(id, "Doublon", None, None).await.unwrap();
        h.claim_service.close(id, None).await.unwrap();

        let error = h.claim_service.close(id, None).await.unwrap_err();
        assert_error_kind(error.kind(), ErrorKind::InvalidStateTransition);
    }
}

// ============= DRAFT EDITS =============
mod update_tests {
    use super::*;

    fn update(claim_date: chrono::NaiveDate) -> ClaimUpdate {
        ClaimUpdate {
            claim_date,
            location: "Pont HKB, Abidjan".to_string(),
            description: "Accrochage latéral".to_string(),
            circumstances: None,
            claimed_amount: MoneyFixtures::xof(dec!(300000)),
            motor: MotorClaimDetails::new(MotorClaimType::GlassBreakage),
        }
    }

    #[tokio::test]
    async fn test_draft_claim_can_be_edited() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();

        let updated = h
            .claim_service
            .update_claim(id, update(TemporalFixtures::date(2025, 6, 20)), HANDLER)
            .await
            .unwrap();
        assert_eq!(updated.location(), "Pont HKB, Abidjan");
        assert_amount(&updated.claimed_amount(), dec!(300000));
        assert_eq!(updated.history().last().unwrap().action_type, HistoryAction::ClaimUpdated);
    }

    #[tokio::test]
    async fn test_edit_outside_coverage_is_rejected() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();

        let error = h
            .claim_service
            .update_claim(id, update(TemporalFixtures::date(2027, 1, 1)), None)
            .await
            .unwrap_err();
        assert!(matches!(error, ClaimError::OutOfCoveragePeriod(_)));
    }

    #[tokio::test]
    async fn test_submitted_claim_cannot_be_edited() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();
        h.claim_service.submit(id, None).await.unwrap();

        let error = h
            .claim_service
            .update_claim(id, update(TemporalFixtures::loss_date()), None)
            .await
            .unwrap_err();
        assert_error_kind(error.kind(), ErrorKind::InvalidStateTransition);
    }
}

// ============= THIRD PARTIES AND DOCUMENTS =============
mod attachment_tests {
    use super::*;

    #[tokio::test]
    async fn test_third_party_lifecycle() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();

        let party = h
            .claim_service
            .add_third_party(id, ThirdPartyDetails::new("Moussa Diabaté"), HANDLER)
            .await
            .unwrap();
        let mut details = party.details.clone();
        details.insurance_company = Some("Sunu Assurances".to_string());
        let updated = h
            .claim_service
            .update_third_party(id, party.id, details, HANDLER)
            .await
            .unwrap();
        assert_eq!(updated.details.insurance_company.as_deref(), Some("Sunu Assurances"));

        h.claim_service.remove_third_party(id, party.id, HANDLER).await.unwrap();
        let stored = h.claim_service.get_by_id(id).await.unwrap();
        assert!(stored.third_parties().is_empty());

        let error = h
            .claim_service
            .remove_third_party(id, party.id, HANDLER)
            .await
            .unwrap_err();
        assert_error_kind(error.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_documents_are_listed_and_deleted() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();

        let document = h.claim_service.upload_document(id, constat(), HANDLER).await.unwrap();
        assert_eq!(document.uploaded_by.as_deref(), Some("k.kouassi"));
        assert_eq!(h.claim_service.list_documents(id).await.unwrap().len(), 1);

        h.claim_service.delete_document(id, document.id, None).await.unwrap();
        assert!(h.claim_service.list_documents(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_document_without_type_is_rejected() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();
        let mut upload = constat();
        upload.document_type = " ".to_string();

        let error = h.claim_service.upload_document(id, upload, None).await.unwrap_err();
        assert_error_kind(error.kind(), ErrorKind::Validation);
    }
}

// ============= HISTORY AND QUERIES =============
mod history_tests {
    use super::*;

    #[tokio::test]
    async fn test_history_is_append_only_and_ordered() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();
        h.claim_service.submit(id, HANDLER).await.unwrap();
        h.claim_service.update_notes(id, "Client relancé par téléphone", HANDLER).await.unwrap();
        h.claim_service.start_review(id, HANDLER).await.unwrap();

        let history = h.claim_service.get_history(id).await.unwrap();
        let actions: Vec<HistoryAction> = history.iter().map(|e| e.action_type).collect();
        assert_eq!(
            actions,
            vec![
                HistoryAction::ClaimCreated,
                HistoryAction::ClaimSubmitted,
                HistoryAction::NotesUpdated,
                HistoryAction::ReviewStarted,
            ]
        );
        assert_eq!(history[1].old_status, Some(ClaimStatus::Draft));
        assert_eq!(history[1].new_status, Some(ClaimStatus::Submitted));
        assert!(!history[2].is_transition());
    }

    #[tokio::test]
    async fn test_failed_operation_writes_no_history() {
        let h = TestHarness::new().await;
        let id = draft_claim(&h).await.id();
        h.claim_service.close(id, None).await.unwrap_err();

        assert_eq!(h.claim_service.get_history(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lookups_and_listings() {
        let h = TestHarness::new().await;
        let policy = h.active_policy(&[]).await;
        let first = h
            .claim_service
            .create(ClaimRequestBuilder::new(policy.id()).build(), None)
            .await
            .unwrap();
        h.clock.advance(Duration::hours(3));
        let second = h
            .claim_service
            .create(
                ClaimRequestBuilder::new(policy.id()).claim_type(MotorClaimType::Theft).build(),
                None,
            )
            .await
            .unwrap();
        h.claim_service.submit(second.id(), None).await.unwrap();

        let found = h.claim_service.get_by_number("SIN-2025-03-0002").await.unwrap();
        assert_eq!(found.id(), second.id());

        let by_policy = h.claim_service.list_by_policy(policy.id()).await.unwrap();
        assert_eq!(by_policy.iter().map(|c| c.id()).collect::<Vec<_>>(), vec![second.id(), first.id()]);
        assert_eq!(h.claim_service.list_by_client(h.client_id).await.unwrap().len(), 2);
        assert_eq!(h.claim_service.list_all().await.unwrap().len(), 2);

        let drafts = h.claim_service.list_by_status(ClaimStatus::Draft).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id(), first.id());
    }

    #[tokio::test]
    async fn test_unknown_claim_lookups() {
        let h = TestHarness::new().await;

        let error = h.claim_service.get_by_id(core_kernel::ClaimId::new()).await.unwrap_err();
        assert!(matches!(error, ClaimError::ClaimNotFound(_)));
        let error = h.claim_service.get_by_number("SIN-2025-03-0042").await.unwrap_err();
        assert_error_kind(error.kind(), ErrorKind::NotFound);
        let error = h.claim_service.get_by_number("SIN-03-2025").await.unwrap_err();
        assert_error_kind(error.kind(), ErrorKind::Validation);
    }
}
