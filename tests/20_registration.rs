mod common;

use anyhow::Result;
use reqwest::StatusCode;
use sqlx::Row;

use alumni_directory::database::{models::NewUser, users};

use common::{location, seed_section, seed_user, SeedUser, TestApp};

async fn request_count(app: &TestApp) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM registration_requests")
        .fetch_one(app.db.pool())
        .await?;
    Ok(row.try_get("n")?)
}

#[tokio::test]
async fn duplicate_email_is_rejected_without_new_request() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let section = seed_section(&app.db, "Informatique").await?;
    let section_id = section.to_string();
    seed_user(&app.db, SeedUser::new("Ada", "Lovelace").section(section)).await?;

    let before = request_count(&app).await?;
    let res = app
        .client()?
        .post(app.url("/register"))
        .form(&[
            ("email", "Ada.Lovelace@example.org"),
            ("prenom", "Ada"),
            ("nom", "Lovelace"),
            ("annee_diplome", "2015"),
            ("section_id", section_id.as_str()),
        ])
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(
        body["field_errors"]["email"],
        "An account or request already exists for this email"
    );
    assert_eq!(request_count(&app).await?, before);

    app.teardown().await
}

#[tokio::test]
async fn second_request_for_same_email_is_rejected() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let section = seed_section(&app.db, "Chimie").await?;
    let form = [
        ("email", "rosalind@example.org".to_string()),
        ("prenom", "Rosalind".to_string()),
        ("nom", "Franklin".to_string()),
        ("annee_diplome", "2012".to_string()),
        ("section_id", section.to_string()),
    ];

    let client = app.client()?;
    let res = client.post(app.url("/register")).form(&form).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client.post(app.url("/register")).form(&form).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(request_count(&app).await?, 1);

    app.teardown().await
}

#[tokio::test]
async fn invalid_fields_are_reported_together() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };

    let res = app
        .client()?
        .post(app.url("/register"))
        .form(&[
            ("email", "not-an-email"),
            ("prenom", ""),
            ("nom", "Turing"),
            ("annee_diplome", "1850"),
            ("section_id", "999"),
        ])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    let errors = &body["field_errors"];
    assert!(errors["email"].is_string());
    assert!(errors["prenom"].is_string());
    assert!(errors["annee_diplome"].is_string());
    assert_eq!(errors["section_id"], "Unknown section");
    assert!(errors.get("nom").is_none());

    app.teardown().await
}

#[tokio::test]
async fn approval_then_completion_creates_member() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let section = seed_section(&app.db, "Physique").await?;
    let section_id = section.to_string();
    seed_user(&app.db, SeedUser::new("Root", "Admin").admin()).await?;

    let res = app
        .client()?
        .post(app.url("/register"))
        .form(&[
            ("email", "lise.meitner@example.org"),
            ("prenom", "Lise"),
            ("nom", "Meitner"),
            ("annee_diplome", "2001"),
            ("section_id", section_id.as_str()),
            ("message", "Promo 2001"),
        ])
        .send()
        .await?;
    let request_id = common::data(res).await?["id"].as_i64().unwrap();

    let admin = app.login("root.admin@example.org").await?;
    let res = admin
        .post(app.url(&format!("/admin/requests/{}/approve", request_id)))
        .send()
        .await?;
    let approved = common::data(res).await?;
    let completion_url = approved["completion_url"].as_str().unwrap().to_string();
    assert!(completion_url.starts_with("http://directory.test/register/complete/"));
    let path = completion_url.trim_start_matches("http://directory.test");

    let applicant = app.client()?;
    let res = applicant.get(app.url(path)).send().await?;
    assert_eq!(common::data(res).await?["request"]["email"], "lise.meitner@example.org");

    // Mismatched confirmation is refused
    let res = applicant
        .post(app.url(path))
        .form(&[("password", "first-password"), ("password_confirm", "other-password")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = applicant
        .post(app.url(path))
        .form(&[("password", "first-password"), ("password_confirm", "first-password")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/profile");

    let profile = common::data(applicant.get(app.url("/profile")).send().await?).await?;
    assert_eq!(profile["user"]["email"], "lise.meitner@example.org");
    assert_eq!(profile["user"]["is_approved"], true);
    assert_eq!(request_count(&app).await?, 0);

    // The key is single-use
    let res = app.client()?.get(app.url(path)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    app.teardown().await
}

#[tokio::test]
async fn rejected_request_is_deleted() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let section = seed_section(&app.db, "Biologie").await?;
    let section_id = section.to_string();
    seed_user(&app.db, SeedUser::new("Root", "Admin").admin()).await?;

    let res = app
        .client()?
        .post(app.url("/register"))
        .form(&[
            ("email", "spam@example.org"),
            ("prenom", "Spam"),
            ("nom", "Bot"),
            ("annee_diplome", "2020"),
            ("section_id", section_id.as_str()),
        ])
        .send()
        .await?;
    let request_id = common::data(res).await?["id"].as_i64().unwrap();

    let admin = app.login("root.admin@example.org").await?;
    let res = admin
        .post(app.url(&format!("/admin/requests/{}/reject", request_id)))
        .send()
        .await?;
    assert_eq!(location(&res), "/admin/requests?success=rejected");
    assert_eq!(request_count(&app).await?, 0);

    app.teardown().await
}

#[tokio::test]
async fn email_uniqueness_ignores_case() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    seed_user(&app.db, SeedUser::new("Ada", "Lovelace")).await?;

    let err = users::create(
        app.db.pool(),
        &NewUser {
            email: "Ada.Lovelace@Example.ORG".to_string(),
            password_hash: "x".to_string(),
            prenom: "Ada".to_string(),
            nom: "Lovelace".to_string(),
            annee_diplome: None,
            section_id: None,
            is_admin: false,
            is_approved: true,
        },
    )
    .await
    .expect_err("mixed-case duplicate must be refused");
    assert!(err.is_duplicate(), "{}", err);

    let section = seed_section(&app.db, "Chimie").await?;
    sqlx::query(
        "INSERT INTO registration_requests (email, prenom, nom, annee_diplome, section_id)
         VALUES ('grace@example.org', 'Grace', 'Hopper', 1934, $1)",
    )
    .bind(section)
    .execute(app.db.pool())
    .await?;
    let dup = sqlx::query(
        "INSERT INTO registration_requests (email, prenom, nom, annee_diplome, section_id)
         VALUES ('GRACE@example.org', 'Grace', 'Hopper', 1934, $1)",
    )
    .bind(section)
    .execute(app.db.pool())
    .await;
    assert!(dup.is_err());

    app.teardown().await
}
