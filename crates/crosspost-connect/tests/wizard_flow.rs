//! End-to-end wizard flows against stubbed window system and backend.

use std::sync::atomic::Ordering;
use std::time::Duration;

use crosspost_connect::test_utils::{host_origin, StubClient, StubWindowSystem};
use crosspost_connect::{ConnectionWizard, MessageBus, PopupController, WizardStep};
use crosspost_core::message::{CompletionMessage, InboundMessage, Origin};
use crosspost_core::platform::ALL_PLATFORMS;
use crosspost_core::{Error, PlatformId};

fn success(origin: Origin, code: &str, state: &str) -> InboundMessage {
    InboundMessage::new(
        origin,
        CompletionMessage::Success {
            code: code.to_string(),
            state: state.to_string(),
        },
    )
}

fn wizard_with(
    windows: StubWindowSystem,
    client: StubClient,
    bus: &MessageBus,
) -> ConnectionWizard<StubClient, StubWindowSystem> {
    let popup = PopupController::new(windows, bus.clone(), host_origin());
    ConnectionWizard::new(client, popup)
}

#[test]
fn navigation_is_idempotent_for_every_platform() {
    for platform in ALL_PLATFORMS {
        let bus = MessageBus::new();
        let mut wizard = wizard_with(StubWindowSystem::new(), StubClient::new(), &bus);

        wizard.select(platform);
        wizard.back();
        wizard.select(platform);

        assert_eq!(wizard.step(), WizardStep::Authorize);
        assert_eq!(wizard.selected_platform(), Some(platform));
        assert!(!wizard.is_connecting());
        assert!(wizard.last_error().is_none());
    }
}

#[test]
fn closing_at_any_step_any_number_of_times_fully_resets() {
    let bus = MessageBus::new();
    let mut wizard = wizard_with(StubWindowSystem::new(), StubClient::new(), &bus);

    // SelectPlatform
    wizard.close();
    wizard.close();
    assert_eq!(wizard.step(), WizardStep::SelectPlatform);

    // Authorize
    wizard.select(PlatformId::Facebook);
    wizard.close();
    wizard.close();
    assert_eq!(wizard.step(), WizardStep::SelectPlatform);
    assert_eq!(wizard.selected_platform(), None);
    assert!(!wizard.is_connecting());
    assert!(wizard.last_error().is_none());
    assert!(wizard.connection().is_none());
}

#[tokio::test(start_paused = true)]
async fn linkedin_success_path_reaches_complete() {
    let bus = MessageBus::new();
    let client = StubClient::new().with_state("xyz");
    let mut wizard = wizard_with(StubWindowSystem::new(), client.clone(), &bus);

    wizard.select(PlatformId::LinkedIn);

    let publisher = {
        let bus = bus.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            bus.publish(success(host_origin(), "abc", "xyz"));
        })
    };

    wizard.authorize().await;
    publisher.await.unwrap();

    assert_eq!(wizard.step(), WizardStep::Complete);
    assert!(!wizard.is_connecting());
    assert!(wizard.last_error().is_none());

    let connection = wizard.connection().unwrap();
    assert_eq!(connection.platform, PlatformId::LinkedIn);

    let exchanges = client.exchange_requests();
    assert_eq!(exchanges.len(), 1);
    assert_eq!(exchanges[0].platform, PlatformId::LinkedIn);
    assert_eq!(exchanges[0].code, "abc");
    assert_eq!(exchanges[0].state, "xyz");
}

#[tokio::test(start_paused = true)]
async fn twitter_manual_close_stays_in_authorize_with_cancelled_error() {
    let bus = MessageBus::new();
    let windows = StubWindowSystem::new();
    let closed = windows.close_flag();
    let client = StubClient::new();
    let mut wizard = wizard_with(windows, client.clone(), &bus);

    wizard.select(PlatformId::Twitter);

    let closer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        closed.store(true, Ordering::SeqCst);
    });

    wizard.authorize().await;
    closer.await.unwrap();

    assert_eq!(wizard.step(), WizardStep::Authorize);
    assert!(!wizard.is_connecting());
    assert!(matches!(wizard.last_error(), Some(Error::UserCancelled)));
    // No exchange was ever attempted.
    assert!(client.exchange_requests().is_empty());
}

#[tokio::test]
async fn blocked_popup_surfaces_immediately() {
    let bus = MessageBus::new();
    let mut wizard = wizard_with(StubWindowSystem::blocked(), StubClient::new(), &bus);

    wizard.select(PlatformId::Instagram);
    wizard.authorize().await;

    assert_eq!(wizard.step(), WizardStep::Authorize);
    assert!(!wizard.is_connecting());
    assert!(matches!(wizard.last_error(), Some(Error::PopupBlocked)));
}

#[tokio::test(start_paused = true)]
async fn invalid_grant_after_popup_success_stays_in_authorize() {
    let bus = MessageBus::new();
    let windows = StubWindowSystem::new();
    let close_count = windows.close_count();
    let client = StubClient::new().fail_exchange(Error::invalid_grant("code expired"));
    let mut wizard = wizard_with(windows, client.clone(), &bus);

    wizard.select(PlatformId::YouTube);

    let publisher = {
        let bus = bus.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            bus.publish(success(host_origin(), "abc", "xyz"));
        })
    };

    wizard.authorize().await;
    publisher.await.unwrap();

    assert_eq!(wizard.step(), WizardStep::Authorize);
    assert!(!wizard.is_connecting());
    assert!(matches!(wizard.last_error(), Some(Error::InvalidGrant { .. })));
    // The popup was already torn down before the exchange failed.
    assert_eq!(close_count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn forged_origin_never_completes_the_wizard() {
    let bus = MessageBus::new();
    let windows = StubWindowSystem::new();
    let closed = windows.close_flag();
    let client = StubClient::new();
    let mut wizard = wizard_with(windows, client.clone(), &bus);

    wizard.select(PlatformId::TikTok);

    let driver = {
        let bus = bus.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            bus.publish(success(
                Origin::new("https://evil.example.com"),
                "stolen",
                "stolen",
            ));
            // The forgery is ignored; the user gives up and closes.
            tokio::time::sleep(Duration::from_millis(2000)).await;
            closed.store(true, Ordering::SeqCst);
        })
    };

    wizard.authorize().await;
    driver.await.unwrap();

    assert_eq!(wizard.step(), WizardStep::Authorize);
    assert!(matches!(wizard.last_error(), Some(Error::UserCancelled)));
    assert!(client.exchange_requests().is_empty());
}

#[tokio::test]
async fn backend_url_failure_surfaces_without_opening_a_popup() {
    let bus = MessageBus::new();
    let client = StubClient::new().fail_authorization_url(Error::network("connection refused"));
    let mut wizard = wizard_with(StubWindowSystem::new(), client.clone(), &bus);

    wizard.select(PlatformId::LinkedIn);
    wizard.authorize().await;

    assert_eq!(wizard.step(), WizardStep::Authorize);
    assert!(matches!(wizard.last_error(), Some(Error::Network { .. })));

    // Retry after the transient failure succeeds end to end.
    let publisher = {
        let bus = bus.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            bus.publish(success(host_origin(), "abc", "xyz"));
        })
    };
    wizard.authorize().await;
    publisher.await.unwrap();

    assert_eq!(wizard.step(), WizardStep::Complete);
    assert_eq!(client.url_calls(), 2);
}
