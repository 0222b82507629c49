#[macro_use]
extern crate rocket;

pub mod dashboard;
pub mod error;
pub mod lemlist;
pub mod mailboxes;
pub mod models;
pub mod orchestrator;
pub mod request_logger;
pub mod routes;

use crate::lemlist::{LemlistConfig, build_http_client};
use crate::request_logger::RequestLogger;
use crate::routes::LemlistState;
use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::{
    openapi_get_routes,
    rapidoc::{GeneralConfig, HideShowConfig, RapiDocConfig, make_rapidoc},
    settings::UrlObject,
    swagger_ui::{SwaggerUIConfig, make_swagger_ui},
};
use std::sync::Once;

static LOGGER: Once = Once::new();

pub fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

pub fn rocket() -> Rocket<Build> {
    init_logger();

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allow_credentials(true)
        .to_cors()
        .expect("Error creating CORS");

    rocket::build()
        .attach(RequestLogger)
        .attach(cors)
        .attach(AdHoc::try_on_ignite(
            "Lemlist Client",
            |rocket| async move {
                let config = LemlistConfig::from_env();
                if !config.has_credentials() {
                    log::warn!(
                        "LEMLIST_API_KEY is not set; campaign and mailbox routes will fail until it is configured"
                    );
                }

                match build_http_client(&config) {
                    Ok(http) => {
                        log::info!("lemlist client configured for {}", config.base_url);
                        Ok(rocket.manage(LemlistState::new(config, http)))
                    }
                    Err(err) => {
                        log::error!("failed to build lemlist http client: {}", err);
                        Err(rocket)
                    }
                }
            },
        ))
        .mount(
            "/",
            openapi_get_routes![routes::health::index, routes::health::health_check],
        )
        .mount(
            "/api",
            openapi_get_routes![
                // Campaign routes
                routes::campaigns::campaigns_dashboard,
                routes::campaigns::set_campaign_inactive,
                // Mailbox routes
                routes::mailboxes::list_mailboxes,
                routes::mailboxes::start_lemwarm,
                routes::mailboxes::stop_lemwarm,
            ],
        )
        .mount(
            "/api/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .mount(
            "/api/docs/rapidoc/",
            make_rapidoc(&RapiDocConfig {
                general: GeneralConfig {
                    spec_urls: vec![UrlObject::new("Outstack API", "../../openapi.json")],
                    ..Default::default()
                },
                hide_show: HideShowConfig {
                    allow_spec_url_load: false,
                    allow_spec_file_load: false,
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use crate::lemlist::{LemlistConfig, build_http_client};
    use crate::routes::LemlistState;
    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket, Route};

    /// Builder for constructing Rocket instances tailored for integration tests.
    #[derive(Default)]
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        lemlist: Option<LemlistConfig>,
    }

    impl TestRocketBuilder {
        /// Start a builder with sensible defaults: random port, logging disabled.
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                mounts: Vec::new(),
                lemlist: None,
            }
        }

        /// Mount routes under `/api`.
        pub fn mount_api_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/api".to_string(), routes));
            self
        }

        /// Mount routes at the root.
        pub fn mount_root_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/".to_string(), routes));
            self
        }

        /// Manage upstream access pointed at `config` (usually a mock server).
        pub fn manage_lemlist(mut self, config: LemlistConfig) -> Self {
            self.lemlist = Some(config);
            self
        }

        /// Finish building the Rocket instance.
        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment);

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }

            if let Some(config) = self.lemlist {
                let http = build_http_client(&config).expect("http client for tests");
                rocket = rocket.manage(LemlistState::new(config, http));
            }

            rocket
        }

        /// Convenience helper to produce a blocking local client.
        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        /// Convenience helper to produce an asynchronous local client.
        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}
