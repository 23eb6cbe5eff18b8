//! API integration tests
//!
//! Run against a live server with a migrated database:
//! cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// Unique suffix so tests can be re-run against the same database
fn unique(name: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("{}_{}", name, nanos)
}

/// Sign up a fresh account and return (token, user id, username)
async fn signup(client: &Client, role: &str) -> (String, i64, String) {
    let username = unique(&role.to_lowercase());
    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "testpass",
            "role": role
        }))
        .send()
        .await
        .expect("Failed to send signup request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse signup response");
    let token = body["token"].as_str().expect("No token in response").to_string();
    let user_id = body["user"]["id"].as_i64().expect("No user id in response");
    (token, user_id, username)
}

/// Create a book as the given librarian and return its id
async fn create_book(client: &Client, librarian_token: &str) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian_token))
        .json(&json!({
            "title": "T",
            "author": "A",
            "isbn": unique("isbn")
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse book response");
    assert_eq!(body["status"], "AVAILABLE");
    body["id"].as_i64().expect("No book id")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_signup_and_login() {
    let client = Client::new();
    let username = unique("alice");

    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "pw1",
            "role": "MEMBER"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["role"], "MEMBER");
    assert!(body["user"]["password"].is_null());
    let signup_id = body["user"]["id"].as_i64().unwrap();

    // Correct password logs in to the same user
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({"username": username, "password": "pw1"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["id"].as_i64().unwrap(), signup_id);

    // Wrong password is rejected with the generic message
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({"username": username, "password": "wrong"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
#[ignore]
async fn test_login_unknown_user_matches_wrong_password() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({"username": unique("nobody"), "password": "pw"}))
        .send()
        .await
        .expect("Failed to send request");

    // Same status and body as a wrong password: no user enumeration
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
#[ignore]
async fn test_signup_validation() {
    let client = Client::new();

    // Missing password
    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({"username": unique("bob"), "role": "MEMBER"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Unknown role
    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({"username": unique("bob"), "password": "pw", "role": "ADMIN"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Invalid role");
}

#[tokio::test]
#[ignore]
async fn test_signup_duplicate_username() {
    let client = Client::new();
    let (_, _, username) = signup(&client, "MEMBER").await;

    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "otherpass",
            "role": "LIBRARIAN"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Username already exists");
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_request() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Please authenticate");
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_add_book() {
    let client = Client::new();
    let (member_token, _, _) = signup(&client, "MEMBER").await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .json(&json!({"title": "T", "author": "A", "isbn": unique("isbn")}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Access denied. Librarian role required.");
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_lifecycle() {
    let client = Client::new();
    let (librarian_token, _, _) = signup(&client, "LIBRARIAN").await;
    let (member_token, member_id, _) = signup(&client, "MEMBER").await;

    let book_id = create_book(&client, &librarian_token).await;

    // Borrow succeeds
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // Second borrow is rejected
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Book is already borrowed");

    // Return succeeds
    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // The member's record for this book now carries a return date
    let response = client
        .get(format!("{}/users/history/own", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let history: Value = response.json().await.expect("Failed to parse response");
    let record = history
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["book_id"].as_i64() == Some(book_id))
        .expect("No loan record for borrowed book");
    assert_eq!(record["user_id"].as_i64(), Some(member_id));
    assert!(!record["return_date"].is_null());

    // Returning an available book is rejected
    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Book is already available");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrow_only_one_succeeds() {
    let client = Client::new();
    let (librarian_token, _, _) = signup(&client, "LIBRARIAN").await;
    let (first_token, _, _) = signup(&client, "MEMBER").await;
    let (second_token, _, _) = signup(&client, "MEMBER").await;

    let book_id = create_book(&client, &librarian_token).await;

    // Two members race for the same copy
    let (first, second) = tokio::join!(
        client
            .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
            .header("Authorization", format!("Bearer {}", first_token))
            .send(),
        client
            .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
            .header("Authorization", format!("Bearer {}", second_token))
            .send(),
    );

    let mut outcomes = Vec::new();
    for response in [
        first.expect("Failed to send request"),
        second.expect("Failed to send request"),
    ] {
        let status = response.status();
        let body: Value = response.json().await.expect("Failed to parse response");
        outcomes.push((status, body));
    }

    assert_eq!(
        outcomes.iter().filter(|(status, _)| *status == 200).count(),
        1,
        "exactly one borrow must win: {:?}",
        outcomes
    );
    let loser = outcomes
        .iter()
        .find(|(status, _)| *status == 400)
        .expect("expected one rejected borrow");
    assert_eq!(loser.1["error"], "Book is already borrowed");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_rejected() {
    let client = Client::new();
    let (librarian_token, _, _) = signup(&client, "LIBRARIAN").await;
    let isbn = unique("isbn");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian_token))
        .json(&json!({"title": "T", "author": "A", "isbn": isbn}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian_token))
        .json(&json!({"title": "T2", "author": "A2", "isbn": isbn}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_create_same_isbn_single_conflict() {
    // Whichever request loses the race lands on the unique index rather
    // than the existence probe; both paths must surface as a 400, never
    // a 500.
    let client = Client::new();
    let (librarian_token, _, _) = signup(&client, "LIBRARIAN").await;
    let isbn = unique("isbn");
    let body = json!({"title": "T", "author": "A", "isbn": isbn});

    let (first, second) = tokio::join!(
        client
            .post(format!("{}/books", BASE_URL))
            .header("Authorization", format!("Bearer {}", librarian_token))
            .json(&body)
            .send(),
        client
            .post(format!("{}/books", BASE_URL))
            .header("Authorization", format!("Bearer {}", librarian_token))
            .json(&body)
            .send(),
    );

    let statuses = [
        first.expect("Failed to send request").status(),
        second.expect("Failed to send request").status(),
    ];

    assert_eq!(
        statuses.iter().filter(|s| **s == 201).count(),
        1,
        "exactly one create must win: {:?}",
        statuses
    );
    assert_eq!(
        statuses.iter().filter(|s| **s == 400).count(),
        1,
        "the losing create must be a conflict, not a server error: {:?}",
        statuses
    );
}

#[tokio::test]
#[ignore]
async fn test_me_returns_token_identity() {
    let client = Client::new();
    let (member_token, member_id, username) = signup(&client, "MEMBER").await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["id"].as_i64(), Some(member_id));
    assert_eq!(body["username"].as_str(), Some(username.as_str()));
    assert_eq!(body["role"], "MEMBER");

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_unknown_book() {
    let client = Client::new();
    let (librarian_token, _, _) = signup(&client, "LIBRARIAN").await;
    let (member_token, _, _) = signup(&client, "MEMBER").await;

    // Create and delete a book to get an id that is guaranteed absent
    let book_id = create_book(&client, &librarian_token).await;
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Book not found");

    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Book not found");
}

#[tokio::test]
#[ignore]
async fn test_return_without_own_loan_still_frees_book() {
    // Pins the preserved historical quirk: returning a book someone else
    // borrowed frees the book but leaves the borrower's record open.
    let client = Client::new();
    let (librarian_token, _, _) = signup(&client, "LIBRARIAN").await;
    let (borrower_token, _, _) = signup(&client, "MEMBER").await;
    let (other_token, _, _) = signup(&client, "MEMBER").await;

    let book_id = create_book(&client, &librarian_token).await;

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // A different member returns it
    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // The borrower's record is still outstanding
    let response = client
        .get(format!("{}/users/history/own", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    let history: Value = response.json().await.expect("Failed to parse response");
    let record = history
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["book_id"].as_i64() == Some(book_id))
        .expect("No loan record for borrowed book");
    assert!(record["return_date"].is_null());

    // The book itself is available again
    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    let books: Value = response.json().await.expect("Failed to parse response");
    let book = books
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["id"].as_i64() == Some(book_id))
        .expect("Book missing from catalog");
    assert_eq!(book["status"], "AVAILABLE");
}

#[tokio::test]
#[ignore]
async fn test_update_member_requires_a_field() {
    let client = Client::new();
    let (librarian_token, _, _) = signup(&client, "LIBRARIAN").await;
    let (_, member_id, _) = signup(&client, "MEMBER").await;

    let response = client
        .put(format!("{}/users/{}", BASE_URL, member_id))
        .header("Authorization", format!("Bearer {}", librarian_token))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Missing required fields");
}

#[tokio::test]
#[ignore]
async fn test_soft_delete_invalidates_account() {
    let client = Client::new();
    let (librarian_token, _, _) = signup(&client, "LIBRARIAN").await;
    let (member_token, member_id, username) = signup(&client, "MEMBER").await;

    // Librarian removes the member
    let response = client
        .delete(format!("{}/users/{}", BASE_URL, member_id))
        .header("Authorization", format!("Bearer {}", librarian_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // The account shows up in the deleted view, credentials stripped
    let response = client
        .get(format!("{}/users/deleted", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let deleted: Value = response.json().await.expect("Failed to parse response");
    let entry = deleted
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["id"].as_i64() == Some(member_id))
        .expect("Deleted member not listed");
    assert_eq!(entry["username"].as_str(), Some(username.as_str()));
    assert!(entry["password"].is_null());

    // Outstanding tokens stop working
    let response = client
        .get(format!("{}/users/history/own", BASE_URL))
        .header("Authorization", format!("Bearer {}", member_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    // And the login is gone too, with the generic message
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({"username": username, "password": "testpass"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
#[ignore]
async fn test_book_crud() {
    let client = Client::new();
    let (librarian_token, _, _) = signup(&client, "LIBRARIAN").await;

    let book_id = create_book(&client, &librarian_token).await;

    // Update
    let new_isbn = unique("isbn");
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian_token))
        .json(&json!({"title": "T2", "author": "A2", "isbn": new_isbn}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "T2");

    // Update with a missing field is rejected
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian_token))
        .json(&json!({"title": "T3"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Delete
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // Gone now
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}
