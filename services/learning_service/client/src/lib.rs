//! Typed client for the learning service.
//!
//! Every call runs as one [`Exchange`]: the access token is attached to the request, and when
//! the service answers `Unauthenticated` the refresh token is redeemed through a
//! [`TokenRefresher`] and the call is retried once. A session whose refresh fails, or whose
//! refreshed token is rejected again, is logged out and further calls fail fast.

use std::error::Error;
use std::future::Future;

use async_trait::async_trait;
use service_core::auth::session::InvalidTransition;
use service_core::auth::{Exchange, SessionState, TokenPair};
use thiserror::Error;
use tokio::sync::RwLock;
use tonic::transport::Channel;
use tonic::{Code, Request, Response, Status};

pub use learning_service::pb;
use learning_service::pb::learning_service_client::LearningServiceClient;
use learning_service::pb::*;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid endpoint {0:?}.")]
    InvalidEndpoint(String),

    #[error("Failed to connect: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("Call failed: {0}")]
    Status(#[from] Status),

    #[error("Session is logged out.")]
    LoggedOut,

    #[error(transparent)]
    Session(#[from] InvalidTransition),
}

/// Redeems a refresh token for a new token pair, usually by calling the identity service.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, Box<dyn Error + Send + Sync>>;
}

/// Runs `call` with the access token of `tokens`, refreshing at most once on `Unauthenticated`.
///
/// Returns the result of the call together with the state the session ended in, which holds
/// the refreshed tokens when a refresh happened.
pub async fn run_exchange<T, F, Fut, R>(
    tokens: TokenPair,
    refresher: &R,
    mut call: F,
) -> (Result<T, ClientError>, SessionState)
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, Status>>,
    R: TokenRefresher + ?Sized,
{
    let mut exchange = Exchange::new(tokens);
    let result = loop {
        let access_token = match exchange.access_token() {
            Some(token) => token.to_owned(),
            None => break Err(ClientError::LoggedOut),
        };

        let status = match call(access_token).await {
            Err(status) if status.code() == Code::Unauthenticated => status,
            other => break other.map_err(ClientError::from),
        };

        tracing::debug!(message = %status.message(), "Access token rejected.");
        let refresh_token = match exchange.on_unauthorized() {
            Ok(SessionState::Refreshing { refresh_token }) => refresh_token.clone(),
            Ok(_) => break Err(ClientError::LoggedOut),
            Err(e) => break Err(e.into()),
        };

        let transition = match refresher.refresh(&refresh_token).await {
            Ok(tokens) => exchange.on_refreshed(tokens).map(|_| ()),
            Err(e) => {
                tracing::warn!(error = ?e, "Token refresh failed.");
                match exchange.on_refresh_failed() {
                    Ok(_) => break Err(ClientError::LoggedOut),
                    Err(e) => Err(e),
                }
            }
        };
        if let Err(e) = transition {
            break Err(e.into());
        }
    };

    (result, exchange.into_state())
}

fn authorized<T>(input: T, access_token: &str) -> Result<Request<T>, Status> {
    let value = format!("Bearer {}", access_token)
        .parse()
        .map_err(|_| Status::unauthenticated("Access token is not a valid header value."))?;
    let mut request = Request::new(input);
    request.metadata_mut().insert("authorization", value);

    Ok(request)
}

macro_rules! rpc {
    ($($name:ident($input:ty) -> $output:ty;)*) => {
        $(
            pub async fn $name(&self, input: $input) -> Result<$output, ClientError> {
                self.call(input, |mut client, request| async move {
                    client.$name(request).await.map(Response::into_inner)
                })
                .await
            }
        )*
    };
}

pub struct LearningClient<R> {
    inner: LearningServiceClient<Channel>,
    refresher: R,
    /// `None` once the session is logged out.
    tokens: RwLock<Option<TokenPair>>,
}

impl<R: TokenRefresher> LearningClient<R> {
    pub async fn connect(endpoint: impl Into<String>, tokens: TokenPair, refresher: R) -> Result<Self, ClientError> {
        let endpoint = endpoint.into();
        let channel = Channel::from_shared(endpoint.clone())
            .map_err(|_| ClientError::InvalidEndpoint(endpoint))?
            .connect()
            .await?;

        Ok(LearningClient::new(channel, tokens, refresher))
    }

    pub fn new(channel: Channel, tokens: TokenPair, refresher: R) -> Self {
        LearningClient {
            inner: LearningServiceClient::new(channel),
            refresher,
            tokens: RwLock::new(Some(tokens)),
        }
    }

    /// Tokens in use, `None` when logged out.
    pub async fn tokens(&self) -> Option<TokenPair> {
        self.tokens.read().await.clone()
    }

    rpc! {
        enroll(EnrollInput) -> EnrollOutput;
        check_access(CheckAccessInput) -> CheckAccessOutput;
        list_enrollments(ListEnrollmentsInput) -> ListEnrollmentsOutput;
        mark_lesson_complete(MarkLessonCompleteInput) -> MarkLessonCompleteOutput;
        list_completed_lessons(ListCompletedLessonsInput) -> ListCompletedLessonsOutput;
        get_progress(GetProgressInput) -> GetProgressOutput;
        create_quiz(CreateQuizInput) -> CreateQuizOutput;
        add_question(AddQuestionInput) -> AddQuestionOutput;
        get_quiz(GetQuizInput) -> GetQuizOutput;
        submit_quiz(SubmitQuizInput) -> SubmitQuizOutput;
        get_latest_attempt(GetLatestAttemptInput) -> GetLatestAttemptOutput;
        list_attempts(ListAttemptsInput) -> ListAttemptsOutput;
        get_quiz_stats(GetQuizStatsInput) -> GetQuizStatsOutput;
        get_course_analytics(GetCourseAnalyticsInput) -> GetCourseAnalyticsOutput;
        get_certificate_eligibility(GetCertificateEligibilityInput) -> GetCertificateEligibilityOutput;
    }

    async fn call<T, U, F, Fut>(&self, input: T, rpc: F) -> Result<U, ClientError>
    where
        T: Clone,
        F: Fn(LearningServiceClient<Channel>, Request<T>) -> Fut,
        Fut: Future<Output = Result<U, Status>>,
    {
        let tokens = self.tokens().await.ok_or(ClientError::LoggedOut)?;
        let rpc = &rpc;
        let (result, state) = run_exchange(tokens, &self.refresher, |access_token| {
            let client = self.inner.clone();
            let input = input.clone();
            async move { rpc(client, authorized(input, &access_token)?).await }
        })
        .await;

        *self.tokens.write().await = match state {
            SessionState::Authenticated(tokens) => Some(tokens),
            _ => None,
        };

        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use rstest::rstest;

    use super::*;

    fn tokens(n: u8) -> TokenPair {
        TokenPair {
            access_token: format!("access-{}", n),
            refresh_token: format!("refresh-{}", n),
        }
    }

    /// Hands out `tokens(2)` or fails, and records the refresh tokens it was given.
    struct FakeRefresher {
        succeed: bool,
        redeemed: Mutex<Vec<String>>,
    }

    impl FakeRefresher {
        fn new(succeed: bool) -> Self {
            FakeRefresher {
                succeed,
                redeemed: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl TokenRefresher for FakeRefresher {
        async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, Box<dyn Error + Send + Sync>> {
            self.redeemed.lock().unwrap().push(refresh_token.to_owned());
            if self.succeed {
                Ok(tokens(2))
            } else {
                Err("refresh token expired".into())
            }
        }
    }

    #[tokio::test]
    async fn accepted_token_needs_no_refresh() {
        let refresher = FakeRefresher::new(true);

        let (result, state) = run_exchange(tokens(1), &refresher, |token| async move { Ok(token) }).await;

        assert_eq!("access-1", result.unwrap());
        assert_eq!(SessionState::Authenticated(tokens(1)), state);
        assert!(refresher.redeemed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_token_is_refreshed_and_retried() {
        let refresher = FakeRefresher::new(true);

        let (result, state) = run_exchange(tokens(1), &refresher, |token| async move {
            if token == "access-1" {
                Err(Status::unauthenticated("expired"))
            } else {
                Ok(token)
            }
        })
        .await;

        assert_eq!("access-2", result.unwrap());
        assert_eq!(SessionState::Authenticated(tokens(2)), state);
        assert_eq!(vec!["refresh-1".to_owned()], *refresher.redeemed.lock().unwrap());
    }

    #[rstest]
    #[case::refresh_fails(false, 1)]
    #[case::refreshed_token_rejected(true, 2)]
    #[tokio::test]
    async fn logs_out_without_looping(#[case] refresh_succeeds: bool, #[case] expected_calls: usize) {
        let refresher = FakeRefresher::new(refresh_succeeds);
        let calls = AtomicUsize::new(0);

        let (result, state) = run_exchange(tokens(1), &refresher, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Status::unauthenticated("rejected")) }
        })
        .await;

        assert!(matches!(result, Err(ClientError::LoggedOut)));
        assert_eq!(SessionState::LoggedOut, state);
        assert_eq!(expected_calls, calls.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn other_errors_are_returned_as_is() {
        let refresher = FakeRefresher::new(true);

        let (result, state) = run_exchange(tokens(1), &refresher, |_| async {
            Err::<(), _>(Status::not_found("no such quiz"))
        })
        .await;

        match result {
            Err(ClientError::Status(status)) => assert_eq!(Code::NotFound, status.code()),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(SessionState::Authenticated(tokens(1)), state);
    }

    #[test]
    fn bearer_header_is_attached() {
        let request = authorized((), "abc").unwrap();
        assert_eq!("Bearer abc", request.metadata().get("authorization").unwrap().to_str().unwrap());

        assert_eq!(Code::Unauthenticated, authorized((), "bad\ntoken").unwrap_err().code());
    }
}
