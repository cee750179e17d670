//! On-demand report and chat commands against fakes.

mod common;

use std::sync::atomic::Ordering;

use broadcaster::{Destination, InboundText};
use common::{carte, image, texts, Harness, Reply, CARTE, IMAGE, TEXTS};
use meteo_client::{AlertLevel, RegionId};
use vigilance_bot::commands::{COMMAND_FAILED, CONFIG_USAGE, INVALID_REGIONS, NO_REGIONS};
use vigilance_bot::{Command, ReportError};

fn requester() -> Destination {
    Destination::Direct("+33611111111".to_string())
}

fn full_upstream(harness: &Harness) {
    harness.transport.set(IMAGE, image());
    harness.transport.set(CARTE, carte(&[("13", 3)], "Vigilance orange vents sur le sud-est."));
    harness.transport.set(
        TEXTS,
        texts(&[
            ("13", "13 Bouches-du-Rhône", "Vents violents."),
            ("2", "02 Aisne", "Pluie."),
        ]),
    );
}

// ============================================================================
// Report
// ============================================================================

#[tokio::test]
async fn test_report_with_image() {
    let harness = Harness::watching(&[("13", 0)]);
    full_upstream(&harness);

    let segments = harness.report_handler().handle(&requester()).await.unwrap();
    assert_eq!(segments, 1);

    let sent = harness.sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].destination, requester());
    assert_eq!(
        sent[0].message.text,
        "**Vigilance en cours:**\n\n\
         **Bouches-du-Rhône** : Vents violents.\n\n\
         Vigilance orange vents sur le sud-est.\n\n"
    );
    assert!(sent[0].attachment_present);

    let image_path = sent[0].message.attachment.clone().unwrap();
    assert!(!image_path.exists());
    assert_eq!(harness.leftover_files(), 0);
}

#[tokio::test]
async fn test_report_does_not_touch_levels() {
    let harness = Harness::watching(&[("13", 1)]);
    full_upstream(&harness);

    harness.report_handler().handle(&requester()).await.unwrap();

    let state = harness.store.snapshot().await;
    assert_eq!(state.regions.get(&RegionId::from("13")), Some(&AlertLevel::GREEN));
}

#[tokio::test]
async fn test_long_report_attaches_image_once() {
    let harness = Harness::watching(&[("13", 0)]);
    full_upstream(&harness);
    let long_text = "Rafales de 120 km/h. ".repeat(200);
    harness
        .transport
        .set(TEXTS, texts(&[("13", "13 Bouches-du-Rhône", long_text.as_str())]));

    let segments = harness.report_handler().handle(&requester()).await.unwrap();

    let sent = harness.sender.sent();
    assert_eq!(segments, sent.len());
    assert!(sent.len() > 1);
    assert!(sent[0].message.attachment.is_some());
    assert!(sent[1..].iter().all(|s| s.message.attachment.is_none()));
    assert!(sent[0].message.text.starts_with("**Vigilance en cours:**\n\n"));
}

#[tokio::test]
async fn test_report_without_current_alert() {
    let harness = Harness::watching(&[("13", 0)]);
    full_upstream(&harness);
    harness.transport.set(TEXTS, Reply::NotFound);

    let err = harness.report_handler().handle(&requester()).await.unwrap_err();

    assert!(matches!(err, ReportError::NoCurrentAlert));
    let sent = harness.sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message.text, "Pas de vigilance en cours.");
    assert!(sent[0].message.attachment.is_none());
}

#[tokio::test]
async fn test_report_token_failure() {
    let harness = Harness::watching(&[("13", 0)]);
    full_upstream(&harness);
    harness.issuer.fail.store(true, Ordering::SeqCst);

    let err = harness.report_handler().handle(&requester()).await.unwrap_err();

    assert!(matches!(err, ReportError::Credential(_)));
    assert_eq!(harness.sender.texts(), vec!["Erreur pendant la génération de token.".to_string()]);
    assert_eq!(harness.transport.total_calls(), 0);
}

#[tokio::test]
async fn test_report_image_failure() {
    let harness = Harness::watching(&[("13", 0)]);
    full_upstream(&harness);
    harness.transport.set(IMAGE, Reply::Fail);

    let err = harness.report_handler().handle(&requester()).await.unwrap_err();

    assert!(matches!(err, ReportError::Image(_)));
    assert_eq!(harness.sender.texts(), vec!["Erreur pendant le chargement de l'image.".to_string()]);
}

#[tokio::test]
async fn test_report_text_failure() {
    let harness = Harness::watching(&[("13", 0)]);
    full_upstream(&harness);
    harness.transport.set(TEXTS, Reply::Fail);

    let err = harness.report_handler().handle(&requester()).await.unwrap_err();

    assert!(matches!(err, ReportError::Text(_)));
    assert_eq!(harness.sender.texts(), vec!["Erreur pendant le chargement du texte.".to_string()]);
}

#[tokio::test]
async fn test_report_attachment_failure() {
    let harness = Harness::watching(&[("13", 0)]);
    full_upstream(&harness);
    harness.sender.fail_attachments.store(true, Ordering::SeqCst);

    let err = harness.report_handler().handle(&requester()).await.unwrap_err();

    assert!(matches!(err, ReportError::Attachment(_)));
    assert_eq!(harness.sender.texts(), vec!["Erreur lors de l'envoi du fichier.".to_string()]);
}

#[tokio::test]
async fn test_failed_reports_leave_no_image_behind() {
    let harness = Harness::watching(&[("13", 0)]);
    full_upstream(&harness);

    harness.transport.set(TEXTS, Reply::Fail);
    for _ in 0..3 {
        assert!(harness.report_handler().handle(&requester()).await.is_err());
    }
    harness.transport.set(TEXTS, Reply::NotFound);
    for _ in 0..3 {
        assert!(harness.report_handler().handle(&requester()).await.is_err());
    }
    harness.transport.set(TEXTS, texts(&[("13", "13 Bouches-du-Rhône", "Vents violents.")]));
    harness.transport.set(CARTE, Reply::Fail);
    assert!(harness.report_handler().handle(&requester()).await.is_err());

    assert_eq!(harness.transport.calls_to(IMAGE), 7);
    assert_eq!(harness.leftover_files(), 0);
}

#[tokio::test]
async fn test_undelivered_image_is_removed() {
    let harness = Harness::watching(&[("13", 0)]);
    full_upstream(&harness);
    harness.sender.fail_attachments.store(true, Ordering::SeqCst);

    assert!(harness.report_handler().handle(&requester()).await.is_err());

    assert_eq!(harness.leftover_files(), 0);
}

// ============================================================================
// Commands
// ============================================================================

fn inbound(text: &str) -> InboundText {
    InboundText {
        sender: "+33611111111".to_string(),
        group_id: Some("Z3JvdXA=".to_string()),
        text: text.to_string(),
    }
}

#[tokio::test]
async fn test_add_regions() {
    let harness = Harness::watching(&[("13", 3)]);

    let handled = harness.router().handle(&inbound("/config add 75 13")).await;
    assert!(handled);

    assert_eq!(
        harness.sender.texts(),
        vec!["Configuration mise à jour: Départements: 13, 75".to_string()]
    );
    assert_eq!(harness.sender.sent()[0].destination, Destination::Group("Z3JvdXA=".to_string()));

    let state = harness.store.snapshot().await;
    assert_eq!(state.regions.get(&RegionId::from("13")), Some(&AlertLevel::UNOBSERVED));
    assert_eq!(state.regions.get(&RegionId::from("75")), Some(&AlertLevel::UNOBSERVED));
}

#[tokio::test]
async fn test_add_rejects_non_numeric() {
    let harness = Harness::watching(&[("13", 3)]);

    let reply = harness
        .router()
        .watch_list_reply(Command::Add("2A 13".to_string()))
        .await
        .unwrap();

    assert_eq!(reply, INVALID_REGIONS);
    assert_eq!(harness.store.snapshot().await.regions.len(), 1);
}

#[tokio::test]
async fn test_add_without_regions() {
    let harness = Harness::watching(&[]);

    let reply = harness.router().watch_list_reply(Command::Add(String::new())).await.unwrap();

    assert_eq!(reply, INVALID_REGIONS);
}

#[tokio::test]
async fn test_remove_regions() {
    let harness = Harness::watching(&[("13", 3), ("75", 1)]);

    let reply = harness
        .router()
        .watch_list_reply(Command::Remove("13".to_string()))
        .await
        .unwrap();

    assert_eq!(reply, "Configuration mise à jour: Départements: 75");
    assert!(!harness.store.snapshot().await.regions.contains_key("13"));
}

#[tokio::test]
async fn test_list_regions() {
    let harness = Harness::watching(&[("75", 1), ("13", 3)]);
    let reply = harness.router().watch_list_reply(Command::List).await.unwrap();
    assert_eq!(reply, "Départements configurés: 13, 75");

    let empty = Harness::watching(&[]);
    let reply = empty.router().watch_list_reply(Command::List).await.unwrap();
    assert_eq!(reply, NO_REGIONS);
}

#[tokio::test]
async fn test_config_usage() {
    let harness = Harness::watching(&[]);

    harness.router().handle(&inbound("/config purge")).await;

    assert_eq!(harness.sender.texts(), vec![CONFIG_USAGE.to_string()]);
}

#[tokio::test]
async fn test_plain_message_is_ignored() {
    let harness = Harness::watching(&[("13", 0)]);

    let handled = harness.router().handle(&inbound("Bonjour à tous")).await;

    assert!(!handled);
    assert!(harness.sender.sent().is_empty());
}

#[tokio::test]
async fn test_report_command_replies_in_conversation() {
    let harness = Harness::watching(&[("13", 0)]);
    full_upstream(&harness);

    harness.router().handle(&inbound("/vigilance")).await;

    let sent = harness.sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].destination, Destination::Group("Z3JvdXA=".to_string()));
    assert!(sent[0].message.attachment.is_some());
}

#[test]
fn test_command_failure_text() {
    assert!(COMMAND_FAILED.contains("administrateur"));
}
