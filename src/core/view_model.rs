use super::draft::{Draft, DraftField};
use super::roster::{Effect, RosterError, RosterEvent, RosterState};
use super::user::{Snapshot, User, UserId};
use crate::service::UserService;

/// Drives a [`RosterState`] against a [`UserService`], running each
/// operation's requests to completion one after another.
pub struct CollectionViewModel<S> {
    service: S,
    state: RosterState,
}

impl<S: UserService> CollectionViewModel<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: RosterState::new(),
        }
    }

    pub fn state(&self) -> &RosterState {
        &self.state
    }

    pub fn draft(&self) -> &Draft {
        self.state.draft()
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.state.snapshot()
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn on_field_change(&mut self, field: DraftField, value: impl Into<String>) -> Result<(), RosterError> {
        self.state
            .update(RosterEvent::FieldChanged(field, value.into()))
            .map(|_| ())
    }

    /// Validate and create the drafted user, then refresh the list.
    ///
    /// Returns the created user when the service's answer (or the refreshed
    /// list) identifies it.
    pub async fn on_submit(&mut self) -> Result<Option<User>, RosterError> {
        match self.drive(RosterEvent::Submit).await? {
            Effect::Submitted(user) => Ok(user),
            _ => Ok(None),
        }
    }

    pub async fn refresh(&mut self) -> Result<(), RosterError> {
        self.drive(RosterEvent::RefreshRequested).await.map(|_| ())
    }

    /// Look up a single user and make it the selection.
    pub async fn inspect(&mut self, id: UserId) -> Result<Option<User>, RosterError> {
        self.drive(RosterEvent::Inspect(id)).await?;
        Ok(self.state.selected().cloned())
    }

    async fn drive(&mut self, event: RosterEvent) -> Result<Effect, RosterError> {
        let mut effect = self.state.update(event)?;
        loop {
            let next = match effect {
                Effect::Create(user) => RosterEvent::CreateFinished(self.service.create(&user).await),
                Effect::FetchAll(ticket) => {
                    RosterEvent::FetchFinished(ticket, self.service.fetch_all().await)
                }
                Effect::FetchOne(id) => {
                    let result = self.service.fetch_one(&id).await;
                    RosterEvent::InspectFinished(id, result)
                }
                done @ (Effect::None | Effect::Submitted(_)) => return Ok(done),
            };
            effect = self.state.update(next)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::draft::{NewUser, ValidationError};
    use crate::core::roster::Phase;
    use crate::service::{CreateError, Created, FetchError};
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        FetchAll,
        Create(NewUser),
        FetchOne(UserId),
        Ping,
    }

    /// In-memory users service that records every call.
    #[derive(Default)]
    struct FakeService {
        users: Mutex<Vec<User>>,
        calls: Mutex<Vec<Call>>,
        acknowledge_only: bool,
        fail_create: Option<CreateError>,
        fail_fetch: Mutex<Option<FetchError>>,
    }

    impl FakeService {
        fn with_users(users: Vec<User>) -> Self {
            Self {
                users: Mutex::new(users),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl UserService for FakeService {
        async fn fetch_all(&self) -> Result<Snapshot, FetchError> {
            self.record(Call::FetchAll);
            if let Some(e) = self.fail_fetch.lock().unwrap().take() {
                return Err(e);
            }
            Ok(Snapshot::new(self.users.lock().unwrap().clone()))
        }

        async fn create(&self, user: &NewUser) -> Result<Created, CreateError> {
            self.record(Call::Create(user.clone()));
            if let Some(e) = &self.fail_create {
                return Err(e.clone());
            }
            let mut users = self.users.lock().unwrap();
            let created = User::new(
                (users.len() + 1).to_string(),
                user.username.clone(),
                user.email.clone(),
            );
            users.push(created.clone());
            if self.acknowledge_only {
                Ok(Created::Acknowledged {
                    message: format!("{} was added!", user.email),
                })
            } else {
                Ok(Created::User(created))
            }
        }

        async fn fetch_one(&self, id: &UserId) -> Result<User, FetchError> {
            self.record(Call::FetchOne(id.clone()));
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| &u.id == id)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(id.clone()))
        }

        async fn ping(&self) -> Result<String, FetchError> {
            self.record(Call::Ping);
            Ok("pong!".to_string())
        }
    }

    fn ada() -> User {
        User::new("1", "ada", "ada@example.com")
    }

    fn ada_request() -> NewUser {
        NewUser {
            username: "ada".into(),
            email: "ada@example.com".into(),
        }
    }

    #[tokio::test]
    async fn submit_creates_then_refreshes() {
        let mut vm = CollectionViewModel::new(FakeService::default());
        vm.on_field_change(DraftField::Username, "ada").unwrap();
        vm.on_field_change(DraftField::Email, "ada@example.com").unwrap();

        let created = vm.on_submit().await.unwrap();

        assert_eq!(created, Some(ada()));
        assert_eq!(vm.snapshot().users(), &[ada()]);
        assert_eq!(vm.draft(), &Draft::default());
        assert_eq!(vm.state().phase(), &Phase::Idle);
        // Create is acknowledged before the follow-up fetch goes out
        assert_eq!(
            vm.service().calls(),
            vec![Call::Create(ada_request()), Call::FetchAll]
        );
    }

    #[tokio::test]
    async fn empty_username_never_reaches_the_network() {
        let mut vm = CollectionViewModel::new(FakeService::default());
        vm.on_field_change(DraftField::Username, "").unwrap();
        vm.on_field_change(DraftField::Email, "bob@example.com").unwrap();

        let err = vm.on_submit().await.unwrap_err();

        assert!(matches!(
            err,
            RosterError::Validation(ValidationError::EmptyUsername)
        ));
        assert!(vm.service().calls().is_empty());
        assert_eq!(vm.state().phase(), &Phase::Editing);
    }

    #[tokio::test]
    async fn malformed_email_never_reaches_the_network() {
        for email in ["", "bob", "bob@example", "bob at example.com"] {
            let mut vm = CollectionViewModel::new(FakeService::default());
            vm.on_field_change(DraftField::Username, "bob").unwrap();
            vm.on_field_change(DraftField::Email, email).unwrap();

            assert!(matches!(
                vm.on_submit().await,
                Err(RosterError::Validation(ValidationError::InvalidEmail(_)))
            ));
            assert!(vm.service().calls().is_empty(), "{email:?} made a call");
        }
    }

    #[tokio::test]
    async fn failed_create_preserves_state() {
        let service = FakeService {
            fail_create: Some(CreateError::Rejected {
                status: StatusCode::BAD_REQUEST,
                message: "Sorry. That email already exists.".into(),
            }),
            ..FakeService::with_users(vec![ada()])
        };
        let mut vm = CollectionViewModel::new(service);
        vm.refresh().await.unwrap();

        vm.on_field_change(DraftField::Username, "ada2").unwrap();
        vm.on_field_change(DraftField::Email, "ada@example.com").unwrap();
        let err = vm.on_submit().await.unwrap_err();

        assert!(matches!(err, RosterError::Create(CreateError::Rejected { .. })));
        assert_eq!(vm.draft(), &Draft::new("ada2", "ada@example.com"));
        assert_eq!(vm.snapshot().users(), &[ada()]);
        assert_eq!(vm.state().phase(), &Phase::Editing);
        // No refresh after a failed create
        assert_eq!(vm.service().calls().last(), Some(&Call::Create(NewUser {
            username: "ada2".into(),
            email: "ada@example.com".into(),
        })));

        // The user can fix the input and go again
        vm.on_field_change(DraftField::Username, "ada3").unwrap();
        assert_eq!(vm.draft().username, "ada3");
    }

    #[tokio::test]
    async fn failed_refresh_keeps_stale_list() {
        let mut vm = CollectionViewModel::new(FakeService::with_users(vec![ada()]));
        vm.refresh().await.unwrap();

        *vm.service().fail_fetch.lock().unwrap() = Some(FetchError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "down".into(),
        });
        let err = vm.refresh().await.unwrap_err();

        assert!(matches!(err, RosterError::Fetch(FetchError::Status { .. })));
        assert_eq!(vm.snapshot().users(), &[ada()]);
    }

    #[tokio::test]
    async fn refresh_replaces_whole_list() {
        let mut vm = CollectionViewModel::new(FakeService::with_users(vec![
            User::new("1", "michael", "michael@herman.org"),
            User::new("2", "fletcher", "fletcher@notreal.com"),
        ]));
        vm.refresh().await.unwrap();
        assert_eq!(vm.snapshot().len(), 2);

        vm.service().users.lock().unwrap().remove(0);
        vm.refresh().await.unwrap();
        assert_eq!(
            vm.snapshot().users(),
            &[User::new("2", "fletcher", "fletcher@notreal.com")]
        );
    }

    #[tokio::test]
    async fn acknowledged_create_found_in_refreshed_list() {
        let service = FakeService {
            acknowledge_only: true,
            ..FakeService::with_users(vec![User::new("1", "michael", "michael@herman.org")])
        };
        let mut vm = CollectionViewModel::new(service);
        vm.on_field_change(DraftField::Username, "ada").unwrap();
        vm.on_field_change(DraftField::Email, "ada@example.com").unwrap();

        let created = vm.on_submit().await.unwrap();

        assert_eq!(created, Some(User::new("2", "ada", "ada@example.com")));
        assert_eq!(vm.snapshot().len(), 2);
        assert!(vm.draft().is_empty());
    }

    #[tokio::test]
    async fn create_succeeds_but_refresh_fails() {
        let mut vm = CollectionViewModel::new(FakeService::default());
        *vm.service().fail_fetch.lock().unwrap() = Some(FetchError::Status {
            status: StatusCode::BAD_GATEWAY,
            message: "Bad Gateway".into(),
        });
        vm.on_field_change(DraftField::Username, "ada").unwrap();
        vm.on_field_change(DraftField::Email, "ada@example.com").unwrap();

        let err = vm.on_submit().await.unwrap_err();

        assert!(matches!(err, RosterError::Reconcile(_)));
        assert!(vm.draft().is_empty());
        assert_eq!(vm.state().phase(), &Phase::Idle);

        vm.refresh().await.unwrap();
        assert_eq!(vm.snapshot().users(), &[ada()]);
    }

    #[tokio::test]
    async fn inspect_fetches_single_user() {
        let mut vm = CollectionViewModel::new(FakeService::with_users(vec![ada()]));

        let user = vm.inspect(UserId::new("1")).await.unwrap();
        assert_eq!(user, Some(ada()));
        assert_eq!(vm.state().selected(), Some(&ada()));
        // Lookups leave the list and draft alone
        assert!(vm.snapshot().is_empty());
        assert_eq!(vm.service().calls(), vec![Call::FetchOne(UserId::new("1"))]);

        let err = vm.inspect(UserId::new("999")).await.unwrap_err();
        assert!(matches!(err, RosterError::Fetch(FetchError::NotFound(_))));
        assert_eq!(vm.state().selected(), None);
    }

    #[tokio::test]
    async fn ping_passes_through() {
        let vm = CollectionViewModel::new(FakeService::default());
        assert_eq!(vm.service().ping().await.unwrap(), "pong!");
        assert_eq!(vm.service().calls(), vec![Call::Ping]);
    }
}
