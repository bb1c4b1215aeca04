use std::convert::Infallible;
use std::sync::Arc;

use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::{Filter, Rejection, Reply};

use super::types::*;
use super::web_server::{empty_response, error_response, json_response};
use crate::domain::ProfileUpdate;
use crate::error_handling::types::PortalError;
use crate::notify::{EmailDispatcher, EmailMessage, EmailOutcome};
use crate::workflow::PortalService;

/// Size cap for JSON bodies that carry no files.
const SMALL_BODY: u64 = 64 * 1024;

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/assets"]
struct Assets;

fn with_portal(
    portal: Arc<PortalService>,
) -> impl Filter<Extract = (Arc<PortalService>,), Error = Infallible> + Clone {
    warp::any().map(move || portal.clone())
}

/// Token from an `Authorization: Bearer <token>` header, if any.
fn bearer() -> impl Filter<Extract = (Option<String>,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").map(|value: Option<String>| {
        value.and_then(|v| v.strip_prefix("Bearer ").map(|t| t.trim().to_string()))
    })
}

fn json_body<T: DeserializeOwned + Send>(
    limit: u64,
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(limit).and(warp::body::json())
}

fn search_query() -> impl Filter<Extract = (SearchQuery,), Error = Rejection> + Clone {
    warp::query::<SearchQuery>()
}

// ----- static pages and files -----

/// GET / and GET /about
pub fn static_routes() -> BoxedFilter<(Response,)> {
    let index = warp::path::end()
        .and(warp::get())
        .map(|| static_page("index.html"));
    let about = warp::path!("about")
        .and(warp::get())
        .map(|| static_page("about.html"));
    index.or(about).unify().boxed()
}

fn static_page(name: &str) -> Response {
    match Assets::get(name) {
        Some(file) => reply::html(String::from_utf8_lossy(&file.data).into_owned()).into_response(),
        None => error_response(&PortalError::NotFound("Page".into())),
    }
}

/// GET /files/:folder/:name
pub fn files_route(portal: Arc<PortalService>) -> BoxedFilter<(Response,)> {
    warp::path!("files" / String / String)
        .and(warp::get())
        .and(with_portal(portal))
        .and_then(|folder: String, name: String, portal: Arc<PortalService>| async move {
            let response = match portal.read_object(&folder, &name).await {
                Ok((bytes, content_type)) => {
                    reply::with_header(bytes, "content-type", content_type).into_response()
                }
                Err(e) => error_response(&e),
            };
            Ok::<_, Rejection>(response)
        })
        .boxed()
}

// ----- authentication and profile -----

pub fn auth_routes(portal: Arc<PortalService>) -> BoxedFilter<(Response,)> {
    // POST /auth/register
    let register = warp::path!("auth" / "register")
        .and(warp::post())
        .and(with_portal(portal.clone()))
        .and(json_body::<RegisterBody>(SMALL_BODY))
        .and_then(|portal: Arc<PortalService>, body: RegisterBody| async move {
            let result = portal.register(&body.email, &body.password, body.role).await;
            Ok::<_, Rejection>(json_response(result, StatusCode::CREATED))
        });

    // POST /auth/login
    let login = warp::path!("auth" / "login")
        .and(warp::post())
        .and(with_portal(portal.clone()))
        .and(json_body::<LoginBody>(SMALL_BODY))
        .and_then(|portal: Arc<PortalService>, body: LoginBody| async move {
            let result = portal
                .login(&body.email, &body.password)
                .await
                .map(|(session, profile)| LoginResponse {
                    token: session.token,
                    expires_at: session.expires_at,
                    profile,
                });
            Ok::<_, Rejection>(json_response(result, StatusCode::OK))
        });

    // POST /auth/logout
    let logout = warp::path!("auth" / "logout")
        .and(warp::post())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and_then(|portal: Arc<PortalService>, token: Option<String>| async move {
            let result = match token {
                Some(token) => portal.logout(&token).await,
                None => Ok(()),
            };
            Ok::<_, Rejection>(empty_response(result))
        });

    // GET /profile
    let get_profile = warp::path!("profile")
        .and(warp::get())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and_then(|portal: Arc<PortalService>, token: Option<String>| async move {
            let result = portal.authenticate(token.as_deref()).await;
            Ok::<_, Rejection>(json_response(result, StatusCode::OK))
        });

    // PUT /profile
    let put_profile = warp::path!("profile")
        .and(warp::put())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and(json_body::<ProfileUpdate>(SMALL_BODY))
        .and_then(
            |portal: Arc<PortalService>, token: Option<String>, update: ProfileUpdate| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    portal.complete_profile(&actor, update).await
                }
                .await;
                Ok::<_, Rejection>(json_response(result, StatusCode::OK))
            },
        );

    // PUT /profile/signature
    let limit = portal.limits.max_upload_bytes as u64 * 2;
    let signature = warp::path!("profile" / "signature")
        .and(warp::put())
        .and(with_portal(portal))
        .and(bearer())
        .and(json_body::<UploadBody>(limit))
        .and_then(
            |portal: Arc<PortalService>, token: Option<String>, body: UploadBody| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    portal.upload_signature(&actor, body.decode()?).await
                }
                .await;
                Ok::<_, Rejection>(json_response(result, StatusCode::OK))
            },
        );

    register
        .or(login)
        .unify()
        .or(logout)
        .unify()
        .or(get_profile)
        .unify()
        .or(put_profile)
        .unify()
        .or(signature)
        .unify()
        .boxed()
}

// ----- student requests and evidence -----

pub fn student_routes(portal: Arc<PortalService>, body_limit: u64) -> BoxedFilter<(Response,)> {
    // POST /requests
    let submit = warp::path!("requests")
        .and(warp::post())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and(json_body::<SubmissionBody>(body_limit))
        .and_then(
            |portal: Arc<PortalService>, token: Option<String>, body: SubmissionBody| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    portal.submit_request(&actor, body.into_form()?).await
                }
                .await;
                Ok::<_, Rejection>(json_response(result, StatusCode::CREATED))
            },
        );

    // GET /requests/mine
    let mine = warp::path!("requests" / "mine")
        .and(warp::get())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and_then(|portal: Arc<PortalService>, token: Option<String>| async move {
            let result = async {
                let actor = portal.authenticate(token.as_deref()).await?;
                portal.my_requests(&actor).await
            }
            .await;
            Ok::<_, Rejection>(json_response(result, StatusCode::OK))
        });

    // DELETE /requests/:id
    let withdraw = warp::path!("requests" / Uuid)
        .and(warp::delete())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and_then(|id: Uuid, portal: Arc<PortalService>, token: Option<String>| async move {
            let result = async {
                let actor = portal.authenticate(token.as_deref()).await?;
                portal.withdraw_request(&actor, id).await
            }
            .await;
            Ok::<_, Rejection>(empty_response(result))
        });

    // POST /requests/:id/evidence
    let evidence = warp::path!("requests" / Uuid / "evidence")
        .and(warp::post())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and(json_body::<EvidenceBody>(body_limit))
        .and_then(
            |id: Uuid, portal: Arc<PortalService>, token: Option<String>, body: EvidenceBody| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    let upload = body.file.decode()?;
                    portal
                        .upload_evidence(&actor, id, body.kind, body.slot, upload)
                        .await
                }
                .await;
                Ok::<_, Rejection>(json_response(result, StatusCode::OK))
            },
        );

    // DELETE /requests/:id/evidence/:attachment
    let remove = warp::path!("requests" / Uuid / "evidence" / Uuid)
        .and(warp::delete())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and_then(
            |id: Uuid, attachment: Uuid, portal: Arc<PortalService>, token: Option<String>| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    portal.remove_evidence(&actor, id, attachment).await
                }
                .await;
                Ok::<_, Rejection>(json_response(result, StatusCode::OK))
            },
        );

    // POST /requests/:id/prizes
    let stage = warp::path!("requests" / Uuid / "prizes")
        .and(warp::post())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and(json_body::<UploadBody>(body_limit))
        .and_then(
            |id: Uuid, portal: Arc<PortalService>, token: Option<String>, body: UploadBody| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    portal.stage_prize(&actor, id, body.decode()?).await
                }
                .await;
                Ok::<_, Rejection>(json_response(result, StatusCode::CREATED))
            },
        );

    // POST /requests/:id/prizes/:attachment
    let finalize = warp::path!("requests" / Uuid / "prizes" / Uuid)
        .and(warp::post())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and(json_body::<PrizeDetailsBody>(SMALL_BODY))
        .and_then(
            |id: Uuid,
             attachment: Uuid,
             portal: Arc<PortalService>,
             token: Option<String>,
             body: PrizeDetailsBody| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    portal
                        .finalize_prize(&actor, id, attachment, &body.prize_type, &body.event_name)
                        .await
                }
                .await;
                Ok::<_, Rejection>(json_response(result, StatusCode::OK))
            },
        );

    // POST /requests/:id/prize-records
    let record = warp::path!("requests" / Uuid / "prize-records")
        .and(warp::post())
        .and(with_portal(portal))
        .and(bearer())
        .and(json_body::<PrizeDetailsBody>(SMALL_BODY))
        .and_then(
            |id: Uuid, portal: Arc<PortalService>, token: Option<String>, body: PrizeDetailsBody| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    portal
                        .add_prize_record(&actor, id, &body.prize_type, &body.event_name)
                        .await
                }
                .await;
                Ok::<_, Rejection>(json_response(result, StatusCode::CREATED))
            },
        );

    submit
        .or(mine)
        .unify()
        .or(withdraw)
        .unify()
        .or(evidence)
        .unify()
        .or(remove)
        .unify()
        .or(stage)
        .unify()
        .or(finalize)
        .unify()
        .or(record)
        .unify()
        .boxed()
}

// ----- faculty -----

pub fn faculty_routes(portal: Arc<PortalService>) -> BoxedFilter<(Response,)> {
    // GET /faculty/queue?search=
    let queue = warp::path!("faculty" / "queue")
        .and(warp::get())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and(search_query())
        .and_then(
            |portal: Arc<PortalService>, token: Option<String>, query: SearchQuery| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    portal.review_queue(&actor, query.search.as_deref()).await
                }
                .await;
                Ok::<_, Rejection>(json_response(result, StatusCode::OK))
            },
        );

    // GET /faculty/stats
    let stats = warp::path!("faculty" / "stats")
        .and(warp::get())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and_then(|portal: Arc<PortalService>, token: Option<String>| async move {
            let result = async {
                let actor = portal.authenticate(token.as_deref()).await?;
                portal.dashboard_stats(&actor).await
            }
            .await;
            Ok::<_, Rejection>(json_response(result, StatusCode::OK))
        });

    // POST /faculty/requests/:id/advisor
    let advisor = warp::path!("faculty" / "requests" / Uuid / "advisor")
        .and(warp::post())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and(json_body::<ReviewBody>(SMALL_BODY))
        .and_then(
            |id: Uuid, portal: Arc<PortalService>, token: Option<String>, body: ReviewBody| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    portal.advisor_review(&actor, id, body.approve).await
                }
                .await;
                Ok::<_, Rejection>(json_response(result, StatusCode::OK))
            },
        );

    // POST /faculty/requests/:id/hod
    let hod = warp::path!("faculty" / "requests" / Uuid / "hod")
        .and(warp::post())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and(json_body::<ReviewBody>(SMALL_BODY))
        .and_then(
            |id: Uuid, portal: Arc<PortalService>, token: Option<String>, body: ReviewBody| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    portal.hod_review(&actor, id, body.approve).await
                }
                .await;
                Ok::<_, Rejection>(json_response(result, StatusCode::OK))
            },
        );

    // POST /faculty/requests/:id/archive
    let archive = warp::path!("faculty" / "requests" / Uuid / "archive")
        .and(warp::post())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and_then(|id: Uuid, portal: Arc<PortalService>, token: Option<String>| async move {
            let result = async {
                let actor = portal.authenticate(token.as_deref()).await?;
                portal.archive(&actor, id).await
            }
            .await;
            Ok::<_, Rejection>(json_response(result, StatusCode::OK))
        });

    // POST /faculty/requests/:id/restore
    let restore = warp::path!("faculty" / "requests" / Uuid / "restore")
        .and(warp::post())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and_then(|id: Uuid, portal: Arc<PortalService>, token: Option<String>| async move {
            let result = async {
                let actor = portal.authenticate(token.as_deref()).await?;
                portal.restore(&actor, id).await
            }
            .await;
            Ok::<_, Rejection>(json_response(result, StatusCode::OK))
        });

    // DELETE /faculty/requests/:id
    let delete = warp::path!("faculty" / "requests" / Uuid)
        .and(warp::delete())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and_then(|id: Uuid, portal: Arc<PortalService>, token: Option<String>| async move {
            let result = async {
                let actor = portal.authenticate(token.as_deref()).await?;
                portal.hard_delete(&actor, id).await
            }
            .await;
            Ok::<_, Rejection>(empty_response(result))
        });

    // GET /faculty/registry?search=
    let registry = warp::path!("faculty" / "registry")
        .and(warp::get())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and(search_query())
        .and_then(
            |portal: Arc<PortalService>, token: Option<String>, query: SearchQuery| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    portal.registry(&actor, query.search.as_deref()).await
                }
                .await;
                Ok::<_, Rejection>(json_response(result, StatusCode::OK))
            },
        );

    // GET /faculty/registry/export?search=
    let export = warp::path!("faculty" / "registry" / "export")
        .and(warp::get())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and(search_query())
        .and_then(
            |portal: Arc<PortalService>, token: Option<String>, query: SearchQuery| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    portal.export_registry(&actor, query.search.as_deref()).await
                }
                .await;
                let response = match result {
                    Ok(export) => reply::with_header(
                        reply::with_header(
                            export.bytes,
                            "content-type",
                            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                        ),
                        "content-disposition",
                        format!("attachment; filename=\"{}\"", export.file_name),
                    )
                    .into_response(),
                    Err(e) => error_response(&e),
                };
                Ok::<_, Rejection>(response)
            },
        );

    // PUT /faculty/registry/:id/achievement
    let achievement = warp::path!("faculty" / "registry" / Uuid / "achievement")
        .and(warp::put())
        .and(with_portal(portal))
        .and(bearer())
        .and(json_body::<AchievementBody>(SMALL_BODY))
        .and_then(
            |id: Uuid, portal: Arc<PortalService>, token: Option<String>, body: AchievementBody| async move {
                let result = async {
                    let actor = portal.authenticate(token.as_deref()).await?;
                    portal.update_achievement(&actor, id, &body.notes).await
                }
                .await;
                Ok::<_, Rejection>(json_response(result, StatusCode::OK))
            },
        );

    queue
        .or(stats)
        .unify()
        .or(advisor)
        .unify()
        .or(hod)
        .unify()
        .or(archive)
        .unify()
        .or(restore)
        .unify()
        .or(delete)
        .unify()
        .or(registry)
        .unify()
        .or(export)
        .unify()
        .or(achievement)
        .unify()
        .boxed()
}

// ----- public tracking, notifications, email hook -----

/// GET /track/:register_no
pub fn tracking_route(portal: Arc<PortalService>) -> BoxedFilter<(Response,)> {
    warp::path!("track" / String)
        .and(warp::get())
        .and(with_portal(portal))
        .and_then(|register_no: String, portal: Arc<PortalService>| async move {
            let result = portal.track(&register_no).await;
            Ok::<_, Rejection>(json_response(result, StatusCode::OK))
        })
        .boxed()
}

pub fn notification_routes(portal: Arc<PortalService>) -> BoxedFilter<(Response,)> {
    // GET /notifications
    let list = warp::path!("notifications")
        .and(warp::get())
        .and(with_portal(portal.clone()))
        .and(bearer())
        .and_then(|portal: Arc<PortalService>, token: Option<String>| async move {
            let result = async {
                let actor = portal.authenticate(token.as_deref()).await?;
                portal.notifications(&actor).await
            }
            .await;
            Ok::<_, Rejection>(json_response(result, StatusCode::OK))
        });

    // POST /notifications/:id/read
    let read = warp::path!("notifications" / Uuid / "read")
        .and(warp::post())
        .and(with_portal(portal))
        .and(bearer())
        .and_then(|id: Uuid, portal: Arc<PortalService>, token: Option<String>| async move {
            let result = async {
                let actor = portal.authenticate(token.as_deref()).await?;
                portal.mark_read(&actor, id).await
            }
            .await;
            Ok::<_, Rejection>(empty_response(result))
        });

    list.or(read).unify().boxed()
}

/// POST /api/send-email
pub fn email_route(email: Arc<EmailDispatcher>) -> BoxedFilter<(Response,)> {
    warp::path!("api" / "send-email")
        .and(warp::post())
        .and(warp::any().map(move || email.clone()))
        .and(json_body::<EmailMessage>(SMALL_BODY))
        .and_then(|email: Arc<EmailDispatcher>, message: EmailMessage| async move {
            let result = email
                .send(&message)
                .await
                .map(|outcome| match outcome {
                    EmailOutcome::Sent(data) => EmailResponse {
                        success: true,
                        fallback: false,
                        data: Some(data),
                    },
                    EmailOutcome::Simulated => EmailResponse {
                        success: true,
                        fallback: true,
                        data: None,
                    },
                })
                .map_err(PortalError::from);
            Ok::<_, Rejection>(json_response(result, StatusCode::OK))
        })
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::{EmailConfig, InstitutionConfig, LimitsConfig};
    use crate::domain::Role;
    use crate::object_store::FileObjectStore;
    use crate::storage::DatabaseStorage;
    use crate::web_interface::WebServer;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    const PASSWORD: &str = "password123";

    async fn server(dir: &TempDir) -> (Arc<PortalService>, WebServer) {
        let storage = DatabaseStorage::new_file(dir.path().join("portal.sqlite3"))
            .await
            .unwrap();
        let objects =
            FileObjectStore::new(dir.path().join("objects"), "http://localhost:8080").unwrap();
        let portal = Arc::new(
            PortalService::new(
                Arc::new(storage),
                Arc::new(objects),
                InstitutionConfig::default(),
                LimitsConfig::default(),
            )
            .unwrap(),
        );
        let email = Arc::new(EmailDispatcher::new(EmailConfig::default()));
        (portal.clone(), WebServer::new(portal, email))
    }

    /// Registers a user with a complete profile and returns an Authorization header value.
    async fn bearer_for(portal: &PortalService, email: &str, role: Role) -> String {
        let profile = portal.register(email, PASSWORD, role).await.unwrap();
        portal
            .complete_profile(
                &profile,
                ProfileUpdate {
                    full_name: "Kavya".into(),
                    identification_no: "ID-1".into(),
                    department: "Civil Engineering".into(),
                    year: (role == Role::Student).then(|| "3".to_string()),
                    designation: None,
                    is_hod: false,
                },
            )
            .await
            .unwrap();
        let (session, _) = portal.login(email, PASSWORD).await.unwrap();
        format!("Bearer {}", session.token)
    }

    fn message(body: &[u8]) -> String {
        let value: Value = serde_json::from_slice(body).unwrap();
        value["message"].as_str().unwrap_or_default().to_string()
    }

    #[test]
    fn test_static_pages_are_embedded() {
        assert!(Assets::get("index.html").is_some());
        assert!(Assets::get("about.html").is_some());
        assert_eq!(static_page("index.html").status(), StatusCode::OK);
        assert_eq!(static_page("missing.html").status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_not_found() {
        let dir = TempDir::new().unwrap();
        let (_, server) = server(&dir).await;
        let routes = server.routes();

        let res = warp::test::request().path("/nowhere").reply(&routes).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(message(res.body()), "Not found");

        let res = warp::test::request().path("/").reply(&routes).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let dir = TempDir::new().unwrap();
        let (_, server) = server(&dir).await;
        let routes = server.routes();

        let res = warp::test::request().path("/requests/mine").reply(&routes).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = warp::test::request()
            .path("/faculty/stats")
            .header("authorization", "Bearer not-a-session")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_student_is_refused_faculty_routes() {
        let dir = TempDir::new().unwrap();
        let (portal, server) = server(&dir).await;
        let routes = server.routes();
        let student = bearer_for(&portal, "kavya@college.edu", Role::Student).await;

        for path in ["/faculty/stats", "/faculty/queue", "/faculty/registry"] {
            let res = warp::test::request()
                .path(path)
                .header("authorization", student.as_str())
                .reply(&routes)
                .await;
            assert_eq!(res.status(), StatusCode::FORBIDDEN, "{}", path);
            assert!(!message(res.body()).is_empty());
        }

        let res = warp::test::request()
            .path("/requests/mine")
            .header("authorization", student.as_str())
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bad_bodies_are_bad_requests() {
        let dir = TempDir::new().unwrap();
        let (portal, server) = server(&dir).await;
        let routes = server.routes();
        let faculty = bearer_for(&portal, "ravi@college.edu", Role::Faculty).await;

        let res = warp::test::request()
            .method("PUT")
            .path("/profile/signature")
            .header("authorization", faculty.as_str())
            .json(&json!({
                "file_name": "signature.png",
                "content_type": "image/png",
                "data": "this is not base64!",
            }))
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(message(res.body()).contains("base64"));

        let res = warp::test::request()
            .method("POST")
            .path("/auth/login")
            .body("{")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_registry_export_is_an_attachment() {
        let dir = TempDir::new().unwrap();
        let (portal, server) = server(&dir).await;
        let routes = server.routes();
        let faculty = bearer_for(&portal, "ravi@college.edu", Role::Faculty).await;

        let res = warp::test::request()
            .path("/faculty/registry/export")
            .header("authorization", faculty.as_str())
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()["content-type"],
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        let disposition = res.headers()["content-disposition"].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"OD_Registry_"));
        assert!(disposition.ends_with(".xlsx\""));
        assert!(res.body().starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_withdraw_route() {
        let dir = TempDir::new().unwrap();
        let (portal, server) = server(&dir).await;
        let routes = server.routes();
        let student = bearer_for(&portal, "kavya@college.edu", Role::Student).await;

        let res = warp::test::request()
            .method("DELETE")
            .path(&format!("/requests/{}", Uuid::new_v4()))
            .header("authorization", student.as_str())
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(message(res.body()), "Request not found");

        let res = warp::test::request()
            .method("DELETE")
            .path(&format!("/requests/{}", Uuid::new_v4()))
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
