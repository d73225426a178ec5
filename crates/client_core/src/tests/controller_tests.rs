use super::*;
use crate::{
    test_support::{Call, FakeService},
    ClientError,
};

const API_URL: &str = "http://iris.test";

fn controller() -> (Arc<FakeService>, ViewController) {
    let api = Arc::new(FakeService::new());
    let controller = ViewController::new(api.clone(), API_URL);
    (api, controller)
}

fn login_action() -> Action {
    Action::Login {
        username: "alice".into(),
        password: "pw1".into(),
    }
}

fn expect_app(view: View) -> AppView {
    match view {
        View::App(app) => app,
        other => panic!("expected app view, got {other:?}"),
    }
}

fn expect_login(view: View) -> LoginView {
    match view {
        View::Login(login) => login,
        other => panic!("expected login view, got {other:?}"),
    }
}

fn assert_logged_out(controller: &ViewController) {
    assert_eq!(controller.state(), ViewState::LoggedOut);
    assert!(!controller.session().is_authenticated());
    assert_eq!(controller.session().token(), None);
    assert!(controller.cache().is_empty());
}

#[tokio::test]
async fn starts_logged_out_on_the_login_view() {
    let (api, mut controller) = controller();

    let view = expect_login(controller.render().await);

    assert_eq!(view.api_url, API_URL);
    assert!(view.notices.is_empty());
    assert_logged_out(&controller);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn successful_login_switches_to_the_app_view() {
    let (api, mut controller) = controller();

    let app = expect_app(controller.dispatch(login_action()).await);

    assert_eq!(controller.state(), ViewState::LoggedIn);
    assert_eq!(controller.session().token(), Some("T"));
    assert_eq!(controller.session().username(), Some("alice"));
    assert_eq!(app.username, "alice");
    assert_eq!(app.measurement, Measurement::default());
    assert_eq!(app.query, HistoryQuery::default());
    assert_eq!(app.history.rows().len(), 1);
    assert_eq!(api.calls()[0], Call::Login("alice".into()));
}

#[tokio::test]
async fn failed_login_keeps_the_login_view_and_shows_the_reason() {
    let (api, mut controller) = controller();
    api.set_login(Err(ClientError::Auth("Invalid username or password".into())));

    let view = expect_login(controller.dispatch(login_action()).await);

    assert_logged_out(&controller);
    assert_eq!(
        view.notices,
        vec![Notice::new(
            NoticeLevel::Error,
            "Invalid username or password"
        )]
    );
    assert!(api.history_calls().is_empty());
}

#[tokio::test]
async fn connection_failure_on_login_is_shown_not_fatal() {
    let (api, mut controller) = controller();
    api.set_login(Err(ClientError::Connection {
        url: API_URL.into(),
        reason: "connection refused".into(),
    }));

    let view = expect_login(controller.dispatch(login_action()).await);

    assert_logged_out(&controller);
    assert_eq!(view.notices.len(), 1);
    assert!(view.notices[0].text.contains("could not connect"));
}

#[tokio::test]
async fn registration_reports_success_without_logging_in() {
    let (api, mut controller) = controller();

    let view = expect_login(
        controller
            .dispatch(Action::Register {
                username: "bob".into(),
                password: "pw2".into(),
            })
            .await,
    );

    assert_logged_out(&controller);
    assert_eq!(
        view.notices,
        vec![Notice::new(NoticeLevel::Success, REGISTERED_MESSAGE)]
    );
    assert_eq!(api.calls(), vec![Call::Register("bob".into())]);
}

#[tokio::test]
async fn registration_conflict_is_shown() {
    let (api, mut controller) = controller();
    api.set_register(Err(ClientError::Auth("User already exists".into())));

    let view = expect_login(
        controller
            .dispatch(Action::Register {
                username: "alice".into(),
                password: "pw1".into(),
            })
            .await,
    );

    assert_eq!(view.notices[0].level, NoticeLevel::Error);
    assert_eq!(view.notices[0].text, "User already exists");
}

#[tokio::test]
async fn rerendering_an_unchanged_page_uses_the_cache() {
    let (api, mut controller) = controller();
    controller.dispatch(login_action()).await;

    controller.dispatch(Action::Refresh).await;
    controller.render().await;

    assert_eq!(api.history_calls().len(), 1);
}

#[tokio::test]
async fn prediction_is_stored_and_history_is_refetched() {
    let (api, mut controller) = controller();
    controller.dispatch(login_action()).await;
    let measurement = Measurement::new(5.4, 3.4, 1.3, 0.2).expect("measurement");
    controller.dispatch(Action::SetMeasurement(measurement)).await;
    assert_eq!(api.history_calls().len(), 1);

    let app = expect_app(controller.dispatch(Action::Predict).await);

    assert_eq!(controller.session().last_prediction(), Some("setosa"));
    assert_eq!(app.last_prediction.as_deref(), Some("Setosa"));
    assert_eq!(api.history_calls().len(), 2);
    assert!(api.calls().contains(&Call::Predict {
        token: "T".into(),
        measurement,
    }));
}

#[tokio::test]
async fn unauthorized_prediction_logs_out() {
    let (api, mut controller) = controller();
    controller.dispatch(login_action()).await;
    assert!(!controller.cache().is_empty());
    api.set_predict(Err(ClientError::Unauthorized));

    let view = expect_login(controller.dispatch(Action::Predict).await);

    assert_logged_out(&controller);
    assert_eq!(controller.session().username(), None);
    assert_eq!(
        view.notices,
        vec![Notice::new(NoticeLevel::Error, SESSION_EXPIRED_MESSAGE)]
    );
}

#[tokio::test]
async fn unauthorized_history_fetch_logs_out() {
    let (api, mut controller) = controller();
    api.set_history(Err(ClientError::Unauthorized));

    let view = expect_login(controller.dispatch(login_action()).await);

    assert_logged_out(&controller);
    assert_eq!(view.notices[0].text, SESSION_EXPIRED_MESSAGE);

    let view = controller.render().await;
    assert!(view.is_login());
    assert!(view.notices().is_empty());
}

#[tokio::test]
async fn failed_prediction_clears_the_previous_result() {
    let (api, mut controller) = controller();
    controller.dispatch(login_action()).await;
    controller.dispatch(Action::Predict).await;
    assert_eq!(controller.session().last_prediction(), Some("setosa"));

    api.set_predict(Err(ClientError::Api {
        status: 400,
        message: "invalid input".into(),
    }));
    let app = expect_app(controller.dispatch(Action::Predict).await);

    assert_eq!(controller.state(), ViewState::LoggedIn);
    assert_eq!(app.last_prediction, None);
    assert_eq!(app.notices.len(), 1);
    assert_eq!(
        app.notices[0].text,
        "Prediction failed: invalid input (status 400)"
    );
}

#[tokio::test]
async fn empty_history_renders_the_empty_state() {
    let (api, mut controller) = controller();
    api.set_history(Ok(Vec::new()));

    let app = expect_app(controller.dispatch(login_action()).await);

    assert_eq!(app.history, HistoryPanel::Empty);
    assert!(app.notices.is_empty());
}

#[tokio::test]
async fn history_error_is_shown_and_session_survives() {
    let (api, mut controller) = controller();
    api.set_history(Err(ClientError::Api {
        status: 500,
        message: "database down".into(),
    }));

    let app = expect_app(controller.dispatch(login_action()).await);

    assert_eq!(controller.state(), ViewState::LoggedIn);
    assert_eq!(app.history, HistoryPanel::Empty);
    assert_eq!(
        app.notices[0].text,
        "Failed to fetch history: database down (status 500)"
    );
}

#[tokio::test]
async fn logout_clears_session_cache_and_inputs() {
    let (_api, mut controller) = controller();
    controller.dispatch(login_action()).await;
    controller
        .dispatch(Action::SetMeasurement(
            Measurement::new(6.0, 3.0, 4.8, 1.8).expect("measurement"),
        ))
        .await;
    controller.dispatch(Action::NextPage).await;

    let view = expect_login(controller.dispatch(Action::Logout).await);

    assert_logged_out(&controller);
    assert_eq!(
        view.notices,
        vec![Notice::new(NoticeLevel::Info, LOGGED_OUT_MESSAGE)]
    );
    assert_eq!(controller.measurement(), Measurement::default());
    assert_eq!(controller.history_query(), HistoryQuery::default());

    let view = expect_login(controller.dispatch(Action::Logout).await);
    assert!(view.notices.is_empty());
}

#[tokio::test]
async fn new_login_never_reuses_pages_from_the_previous_token() {
    let (api, mut controller) = controller();
    controller.dispatch(login_action()).await;
    controller.dispatch(Action::Logout).await;

    api.set_login(Ok("T2".into()));
    controller.dispatch(login_action()).await;

    let tokens: Vec<String> = api
        .history_calls()
        .into_iter()
        .map(|(token, _)| token)
        .collect();
    assert_eq!(tokens, vec!["T".to_string(), "T2".to_string()]);
}

#[tokio::test]
async fn session_actions_are_refused_while_logged_out() {
    let (api, mut controller) = controller();

    let view = expect_login(controller.dispatch(Action::Predict).await);

    assert_eq!(view.notices[0].text, "Please log in first.");
    assert_eq!(api.predict_calls(), 0);
}

#[tokio::test]
async fn login_is_refused_while_logged_in() {
    let (api, mut controller) = controller();
    controller.dispatch(login_action()).await;

    let app = expect_app(controller.dispatch(login_action()).await);

    assert_eq!(
        app.notices[0].text,
        "Already logged in as alice; log out first."
    );
    let logins = api
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::Login(_)))
        .count();
    assert_eq!(logins, 1);
}

#[tokio::test]
async fn paging_moves_the_offset_and_reuses_cached_pages() {
    let (api, mut controller) = controller();
    controller.dispatch(login_action()).await;

    let app = expect_app(controller.dispatch(Action::NextPage).await);
    assert_eq!(app.query.offset(), 10);

    let app = expect_app(controller.dispatch(Action::PreviousPage).await);
    assert_eq!(app.query.offset(), 0);

    let offsets: Vec<u32> = api
        .history_calls()
        .into_iter()
        .map(|(_, query)| query.offset())
        .collect();
    assert_eq!(offsets, vec![0, 10]);
}

#[tokio::test]
async fn explicit_history_query_is_used_for_the_fetch() {
    let (api, mut controller) = controller();
    controller.dispatch(login_action()).await;
    let query = HistoryQuery::new(25, 50).expect("query");

    let app = expect_app(controller.dispatch(Action::SetHistoryQuery(query)).await);

    assert_eq!(app.query, query);
    assert_eq!(api.history_calls().last().map(|(_, q)| *q), Some(query));
}
