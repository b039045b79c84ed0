use cosmic::app::{Core, Task as CosmicTask, context_drawer};
use cosmic::iced::Length;
use cosmic::widget::{button, container, icon, nav_bar, row, scrollable};
use cosmic::{Application, Element, executor};

use crate::config::RosterConfig;
use crate::core::draft::DraftField;
use crate::core::roster::{Effect, RosterError, RosterEvent, RosterState};
use crate::fl;
use crate::message::{Message, Page};
use crate::pages;
use crate::service::http::UsersClient;
use crate::service::{CreateError, FetchError, UserService};

pub const APP_ID: &str = "dev.roster.app";

pub struct Roster {
    core: Core,
    nav_model: nav_bar::Model,
    config: RosterConfig,
    cosmic_config: cosmic::cosmic_config::Config,
    page: Page,

    // Users
    client: Option<UsersClient>,
    state: RosterState,
    /// Outcome of the last submit or refresh, shown above the list.
    feedback: Option<Result<String, String>>,
    inspector_open: bool,

    // Settings
    timeout_input: String,
    service_test_status: Option<Result<String, String>>,
}

pub struct Flags {
    pub config: RosterConfig,
    pub cosmic_config: cosmic::cosmic_config::Config,
}

impl Application for Roster {
    type Executor = executor::Default;
    type Flags = Flags;
    type Message = Message;

    const APP_ID: &'static str = APP_ID;

    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn init(core: Core, flags: Self::Flags) -> (Self, CosmicTask<Self::Message>) {
        let config = flags.config;

        let mut nav_model = nav_bar::Model::default();
        for page in Page::ALL {
            nav_model
                .insert()
                .text(page.title())
                .icon(icon::from_name(page.icon_name()).icon())
                .data(*page);
        }
        nav_model.activate_position(0);

        let client = build_client(&config);
        let timeout_input = config.request_timeout_secs.to_string();

        let mut app = Self {
            core,
            nav_model,
            config,
            cosmic_config: flags.cosmic_config,
            page: Page::Users,
            client,
            state: RosterState::new(),
            feedback: None,
            inspector_open: false,
            timeout_input,
            service_test_status: None,
        };

        // Load the list straight away when there is somewhere to load it from
        let task = if app.client.is_some() {
            app.dispatch(RosterEvent::RefreshRequested)
        } else {
            CosmicTask::none()
        };

        (app, task)
    }

    fn nav_model(&self) -> Option<&nav_bar::Model> {
        Some(&self.nav_model)
    }

    fn on_nav_select(&mut self, id: nav_bar::Id) -> CosmicTask<Message> {
        if let Some(page) = self.nav_model.data::<Page>(id).copied() {
            self.page = page;
            self.nav_model.activate(id);
        }
        CosmicTask::none()
    }

    fn update(&mut self, message: Message) -> CosmicTask<Message> {
        match message {
            Message::UsernameChanged(value) => {
                return self.dispatch(RosterEvent::FieldChanged(DraftField::Username, value));
            }

            Message::EmailChanged(value) => {
                return self.dispatch(RosterEvent::FieldChanged(DraftField::Email, value));
            }

            Message::Submit => {
                self.feedback = None;
                return self.dispatch(RosterEvent::Submit);
            }

            Message::UserCreated(result) => {
                return self.dispatch(RosterEvent::CreateFinished(result));
            }

            Message::DismissFeedback => {
                self.feedback = None;
            }

            Message::Refresh => {
                return self.dispatch(RosterEvent::RefreshRequested);
            }

            Message::UsersFetched(ticket, result) => {
                return self.dispatch(RosterEvent::FetchFinished(ticket, result));
            }

            Message::InspectUser(id) => {
                self.inspector_open = true;
                self.core.window.show_context = true;
                return self.dispatch(RosterEvent::Inspect(id));
            }

            Message::UserInspected(id, result) => {
                return self.dispatch(RosterEvent::InspectFinished(id, result));
            }

            Message::CloseInspector => {
                self.close_inspector();
            }

            Message::OpenSettings => {
                self.page = Page::Settings;
                let target = self
                    .nav_model
                    .iter()
                    .find(|&id| self.nav_model.data::<Page>(id) == Some(&Page::Settings));
                if let Some(id) = target {
                    self.nav_model.activate(id);
                }
            }

            Message::SetServiceUrl(url) => {
                self.config.service_url = url;
                self.service_test_status = None;
                self.save_config();
                self.client = build_client(&self.config);
                if self.client.is_some() {
                    return self.dispatch(RosterEvent::ServiceChanged);
                }
            }

            Message::SetRequestTimeout(value) => {
                self.timeout_input = value;
                if let Ok(secs) = self.timeout_input.trim().parse::<u64>() {
                    self.config.request_timeout_secs = secs;
                    self.save_config();
                    self.client = build_client(&self.config);
                }
            }

            Message::TestServiceConnection => {
                let Some(client) = self.client.clone() else {
                    self.service_test_status = Some(Err(FetchError::Unconfigured.to_string()));
                    return CosmicTask::none();
                };
                self.service_test_status = None;

                return CosmicTask::perform(
                    async move { client.ping().await.map_err(|e| e.to_string()) },
                    |result| cosmic::Action::App(Message::ServiceConnectionTested(result)),
                );
            }

            Message::ServiceConnectionTested(result) => {
                if let Err(ref e) = result {
                    log::warn!("Users service connection test failed: {}", e);
                }
                self.service_test_status = Some(result);
            }

            Message::ToggleDebugLogging => {
                self.config.debug_logging = !self.config.debug_logging;
                roster::set_debug_logging(self.config.debug_logging);
                self.save_config();
            }
        }

        CosmicTask::none()
    }

    fn header_end(&self) -> Vec<Element<'_, Message>> {
        let mut refresh = button::icon(icon::from_name("view-refresh-symbolic"));
        if self.client.is_some() {
            refresh = refresh.on_press(Message::Refresh);
        }

        vec![
            row()
                .spacing(4)
                .push(refresh)
                .push(
                    button::icon(icon::from_name("emblem-system-symbolic"))
                        .on_press(Message::OpenSettings),
                )
                .into(),
        ]
    }

    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Message>> {
        if !self.inspector_open {
            return None;
        }

        Some(
            context_drawer::context_drawer(
                container(scrollable(pages::users::inspector_view(&self.state).padding(16)))
                    .width(Length::Fill),
                Message::CloseInspector,
            )
            .title(fl!("inspector-title")),
        )
    }

    fn on_escape(&mut self) -> CosmicTask<Message> {
        if self.inspector_open {
            self.close_inspector();
        }
        CosmicTask::none()
    }

    fn view(&self) -> Element<'_, Message> {
        match self.page {
            Page::Users => pages::users::users_view(
                &self.state,
                self.client.is_some(),
                self.feedback.as_ref(),
            ),
            Page::Settings => pages::settings::settings_view(
                &self.config,
                &self.timeout_input,
                &self.service_test_status,
            ),
        }
    }
}

impl Roster {
    /// Feed an event to the roster state and start whatever request it asks for.
    fn dispatch(&mut self, event: RosterEvent) -> CosmicTask<Message> {
        match self.state.update(event) {
            Ok(effect) => self.run_effect(effect),
            Err(e) => {
                self.report(e);
                CosmicTask::none()
            }
        }
    }

    fn run_effect(&mut self, effect: Effect) -> CosmicTask<Message> {
        match effect {
            Effect::None => CosmicTask::none(),

            Effect::Submitted(user) => {
                let msg = match user {
                    Some(user) => fl!("user-added", username = user.username),
                    None => fl!("user-added-unresolved"),
                };
                log::info!("{}", msg);
                self.feedback = Some(Ok(msg));
                CosmicTask::none()
            }

            Effect::Create(new_user) => match self.client.clone() {
                Some(client) => CosmicTask::perform(
                    async move { client.create(&new_user).await },
                    |result| cosmic::Action::App(Message::UserCreated(result)),
                ),
                None => self.dispatch(RosterEvent::CreateFinished(Err(CreateError::Unconfigured))),
            },

            Effect::FetchAll(ticket) => match self.client.clone() {
                Some(client) => CosmicTask::perform(
                    async move { client.fetch_all().await },
                    move |result| cosmic::Action::App(Message::UsersFetched(ticket, result)),
                ),
                None => self.dispatch(RosterEvent::FetchFinished(ticket, Err(FetchError::Unconfigured))),
            },

            Effect::FetchOne(id) => match self.client.clone() {
                Some(client) => {
                    let lookup = id.clone();
                    CosmicTask::perform(
                        async move { client.fetch_one(&lookup).await },
                        move |result| cosmic::Action::App(Message::UserInspected(id.clone(), result)),
                    )
                }
                None => self.dispatch(RosterEvent::InspectFinished(id, Err(FetchError::Unconfigured))),
            },
        }
    }

    fn report(&mut self, error: RosterError) {
        match error {
            RosterError::Validation(_) | RosterError::Busy => log::debug!("{}", error),
            _ => log::warn!("{}", error),
        }
        self.feedback = Some(Err(error.to_string()));
    }

    fn close_inspector(&mut self) {
        self.inspector_open = false;
        self.core.window.show_context = false;
        self.state.clear_selection();
    }

    fn save_config(&self) {
        use cosmic::cosmic_config::CosmicConfigEntry;
        if let Err(e) = self.config.write_entry(&self.cosmic_config) {
            log::error!("Failed to save config: {:?}", e);
        }
    }
}

fn build_client(config: &RosterConfig) -> Option<UsersClient> {
    if !config.is_configured() {
        return None;
    }
    match UsersClient::from_config(config) {
        Ok(client) => {
            log::info!("Using users service at {}", client.base_url());
            Some(client)
        }
        Err(e) => {
            log::error!("Failed to build users client: {}", e);
            None
        }
    }
}
