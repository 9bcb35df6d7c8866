mod common;

use anyhow::Result;
use reqwest::StatusCode;

use alumni_directory::database::users;
use alumni_directory::filter::{DirectoryFilter, DirectoryQuery, SortKey};

use common::{seed_employer, seed_section, seed_user, SeedUser, TestApp};

fn ids(value: &serde_json::Value) -> Vec<i64> {
    value
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["id"].as_i64()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn year_filter_returns_matching_members() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };

    let mut expected = vec![];
    for (i, year) in [2020, 2020, 2021, 2021, 2022].into_iter().enumerate() {
        let user = seed_user(&app.db, SeedUser::new("Member", &format!("N{}", i)).year(year)).await?;
        if year == 2020 {
            expected.push(user.id as i64);
        }
    }
    seed_user(&app.db, SeedUser::new("Viewer", "Only")).await?;

    let client = app.login("viewer.only@example.org").await?;
    let data = common::data(
        client
            .get(app.url("/users/api/users?annee_diplome=2020"))
            .send()
            .await?,
    )
    .await?;

    assert_eq!(data["total"], 2);
    let mut found = ids(&data["users"]);
    found.sort();
    assert_eq!(found, expected);

    app.teardown().await
}

#[tokio::test]
async fn total_matches_unpaginated_count() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let info = seed_section(&app.db, "Informatique").await?;
    let meca = seed_section(&app.db, "Mecanique").await?;
    let names = ["Durand", "Martin", "Bernard", "Petit", "Robert", "Richard", "Dubois"];
    for (i, nom) in names.iter().enumerate() {
        let section = if i % 2 == 0 { info } else { meca };
        seed_user(&app.db, SeedUser::new("Camille", nom).year(2010 + (i as i32 % 3)).section(section)).await?;
    }
    seed_user(&app.db, SeedUser::new("Hidden", "Admin").admin().section(info)).await?;
    seed_user(&app.db, SeedUser::new("Hidden", "Optout").opted_out().section(info)).await?;

    let filters = vec![
        DirectoryFilter::default(),
        DirectoryFilter { section_id: Some(info), ..Default::default() },
        DirectoryFilter { annee_diplome: Some(2011), ..Default::default() },
        DirectoryFilter { search: Some("ar".to_string()), ..Default::default() },
        DirectoryFilter { search: Some(String::new()), ..Default::default() },
        DirectoryFilter { show_admins: true, show_opted_out: true, ..Default::default() },
        DirectoryFilter { section_id: Some(meca), annee_diplome: Some(2010), ..Default::default() },
    ];

    for filter in filters {
        let unpaginated = DirectoryQuery::new(filter.clone(), None)?;
        let all = users::list_directory(app.db.pool(), &unpaginated).await?;
        assert_eq!(all.total, all.rows.len() as i64, "filter {:?}", filter);

        let paged = DirectoryQuery::new(
            DirectoryFilter { limit: Some(2), offset: Some(1), ..filter.clone() },
            None,
        )?;
        let page = users::list_directory(app.db.pool(), &paged).await?;
        assert_eq!(page.total, all.total, "filter {:?}", filter);
        assert!(page.rows.len() <= 2);
    }

    app.teardown().await
}

#[tokio::test]
async fn name_sort_is_non_decreasing() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    for (prenom, nom) in [("Zoe", "Martin"), ("Alice", "Martin"), ("Bob", "Abel"), ("Claire", "Zola"), ("Anne", "Dupont")] {
        seed_user(&app.db, SeedUser::new(prenom, nom)).await?;
    }

    let query = DirectoryQuery::new(DirectoryFilter { sort: SortKey::Name, ..Default::default() }, None)?;
    let page = users::list_directory(app.db.pool(), &query).await?;
    let pairs: Vec<(String, String)> = page.rows.iter().map(|r| (r.nom.clone(), r.prenom.clone())).collect();

    assert_eq!(pairs.len(), 5);
    assert!(pairs.windows(2).all(|w| w[0] <= w[1]), "not sorted: {:?}", pairs);
    assert_eq!(pairs[0], ("Abel".to_string(), "Bob".to_string()));

    app.teardown().await
}

#[tokio::test]
async fn admins_and_opted_out_hidden_by_default() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let member = seed_user(&app.db, SeedUser::new("Plain", "Member")).await?;
    let admin = seed_user(&app.db, SeedUser::new("Root", "Admin").admin()).await?;
    let hidden = seed_user(&app.db, SeedUser::new("Shy", "Member").opted_out()).await?;
    seed_user(&app.db, SeedUser::new("Gone", "Member").inactive()).await?;

    let client = app.login("plain.member@example.org").await?;
    let data = common::data(client.get(app.url("/users/api/users")).send().await?).await?;
    assert_eq!(ids(&data["users"]), vec![member.id as i64]);

    // Members cannot lift the exclusions
    let data = common::data(
        client
            .get(app.url("/users/api/users?show_admins=on&show_opted_out=on"))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(data["total"], 1);

    // Administrators can
    let client = app.login("root.admin@example.org").await?;
    let data = common::data(
        client
            .get(app.url("/users/api/users?show_admins=on&show_opted_out=on"))
            .send()
            .await?,
    )
    .await?;
    let mut found = ids(&data["users"]);
    found.sort();
    let mut expected = vec![member.id as i64, admin.id as i64, hidden.id as i64];
    expected.sort();
    assert_eq!(found, expected);

    app.teardown().await
}

#[tokio::test]
async fn directory_page_reports_pagination() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    for nom in ["A", "B", "C", "D", "E"] {
        seed_user(&app.db, SeedUser::new("Member", nom)).await?;
    }

    let client = app.login("member.a@example.org").await?;
    // per_page is 3 in the test configuration
    let data = common::data(client.get(app.url("/users?page=2")).send().await?).await?;
    assert_eq!(data["total"], 5);
    assert_eq!(data["page"], 2);
    assert_eq!(data["total_pages"], 2);
    assert_eq!(data["users"].as_array().map(Vec::len), Some(2));

    let res = client.get(app.url("/users?page=9223372036854775807")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    app.teardown().await
}

#[tokio::test]
async fn profile_visibility_rules() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    seed_user(&app.db, SeedUser::new("Viewer", "Member")).await?;
    let private = seed_user(&app.db, SeedUser::new("Private", "Contact").no_contact()).await?;
    let hidden = seed_user(&app.db, SeedUser::new("Hidden", "Member").opted_out()).await?;
    seed_user(&app.db, SeedUser::new("Root", "Admin").admin()).await?;

    let client = app.login("viewer.member@example.org").await?;
    let data = common::data(client.get(app.url(&format!("/users/{}", private.id))).send().await?).await?;
    assert_eq!(data["can_see_contact"], false);
    assert_eq!(data["user"]["email"], "");

    let res = client.get(app.url(&format!("/users/{}", hidden.id))).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let admin = app.login("root.admin@example.org").await?;
    let data = common::data(admin.get(app.url(&format!("/users/{}", private.id))).send().await?).await?;
    assert_eq!(data["user"]["email"], "private.contact@example.org");
    let res = admin.get(app.url(&format!("/users/{}", hidden.id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    app.teardown().await
}

#[tokio::test]
async fn employer_filter_and_search_use_current_job() -> Result<()> {
    let Some(app) = TestApp::spawn().await? else { return Ok(()) };
    let acme = seed_employer(&app.db, "Acme Robotics", Some("Industrie")).await?;
    let ada = seed_user(&app.db, SeedUser::new("Ada", "Lovelace")).await?;
    seed_user(&app.db, SeedUser::new("Alan", "Turing")).await?;

    sqlx::query(
        "INSERT INTO user_employment (user_id, employer_id, poste, is_current) VALUES ($1, $2, 'CTO', TRUE)",
    )
    .bind(ada.id)
    .bind(acme)
    .execute(app.db.pool())
    .await?;

    let client = app.login("alan.turing@example.org").await?;
    let data = common::data(
        client
            .get(app.url(&format!("/users/api/users?employer_id={}", acme)))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(ids(&data["users"]), vec![ada.id as i64]);
    assert_eq!(data["users"][0]["employer_nom"], "Acme Robotics");

    let data = common::data(client.get(app.url("/users/api/users?search=robot")).send().await?).await?;
    assert_eq!(ids(&data["users"]), vec![ada.id as i64]);

    let data = common::data(client.get(app.url("/users/employers/list?secteur=industrie")).send().await?).await?;
    assert_eq!(data["employers"][0]["current_employees"], 1);

    let data = common::data(client.get(app.url(&format!("/users/employers/{}", acme))).send().await?).await?;
    assert_eq!(data["employees"][0]["user_id"], ada.id);

    app.teardown().await
}
