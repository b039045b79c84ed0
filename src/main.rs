use cosmic::app::Settings;
use cosmic::cosmic_config::CosmicConfigEntry;
use cosmic::iced::Limits;

mod application;
mod components;
mod localize;
mod message;
mod pages;

use roster::config;
use roster::core;
use roster::service;

use application::{Flags, Roster};
use config::{CONFIG_VERSION, RosterConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cosmic_cfg = cosmic::cosmic_config::Config::new(application::APP_ID, CONFIG_VERSION)
        .expect("Failed to create cosmic config");
    let config = RosterConfig::get_entry(&cosmic_cfg).unwrap_or_else(|(_, cfg)| cfg);

    // Log to the systemd user journal (`journalctl --user -t roster -f`).
    // Roster targets at info/debug (per config), everything else at warn.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                if metadata.target().starts_with("roster") {
                    let max = if roster::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                    metadata.level() <= max
                } else {
                    metadata.level() <= log::LevelFilter::Warn
                }
            }
            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    self.inner.log(record);
                }
            }
            fn flush(&self) {
                self.inner.flush();
            }
        }

        let journal = systemd_journal_logger::JournalLog::new()?
            .with_syslog_identifier("roster".to_string());

        roster::set_debug_logging(config.debug_logging);

        log::set_boxed_logger(Box::new(FilteredJournal { inner: journal }))?;
        // Global max must be Debug so roster debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }

    // USERS_SERVICE_URL wins over the stored URL for this session.
    let config = config.with_env_overrides();

    localize::localize();

    let mut settings = Settings::default();
    settings = settings.size_limits(Limits::NONE.min_width(360.0).min_height(300.0));

    let flags = Flags { config, cosmic_config: cosmic_cfg };
    cosmic::app::run::<Roster>(settings, flags)?;

    Ok(())
}
