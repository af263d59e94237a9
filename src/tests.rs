#[cfg(test)]
mod integration_tests {
    use crate::schemas::{ApiResponse, ErrorResponse, HealthResponse};
    use crate::test_utils::test_utils::{bearer, create_test_user, init_test_tracing, setup_test_app};
    use axum::http::{HeaderValue, StatusCode, header::AUTHORIZATION};
    use axum_test::TestServer;
    use model::entities::user::Role;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    fn auth(token: &str) -> HeaderValue {
        HeaderValue::from_str(token).unwrap()
    }

    async fn create_hostel(server: &TestServer, token: &str, name: &str) -> Value {
        let response = server
            .post("/api/hostels")
            .add_header(AUTHORIZATION, auth(token))
            .json(&json!({
                "name": name,
                "campus": "Main Campus",
                "address": format!("{} Road, Westlands", name),
                "policy": "Mixed"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<ApiResponse<Value>>().data
    }

    async fn create_room(server: &TestServer, token: &str, hostel_id: &str, total_slots: i32) -> Value {
        let response = server
            .post("/api/rooms")
            .add_header(AUTHORIZATION, auth(token))
            .json(&json!({
                "hostel_id": hostel_id,
                "label": "Room 101",
                "block": "A",
                "room_type": "Single",
                "price": "4500.00",
                "billing_cycle": "Per Month",
                "total_slots": total_slots
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<ApiResponse<Value>>().data
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "healthy");
        assert_eq!(body.database, "connected");
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let _guard = init_test_tracing();
        let (app, _) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "full_name": "Jane Wanjiku",
                "email": "Jane@Example.com",
                "password": "password123"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        assert!(body.success);
        assert_eq!(body.data["user"]["email"], "jane@example.com");
        assert_eq!(body.data["user"]["role"], "Student");
        assert!(body.data["user"].get("password_hash").is_none());
        assert!(!body.data["token"].as_str().unwrap().is_empty());

        // Same email again
        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "full_name": "Jane Again",
                "email": "jane@example.com",
                "password": "password123"
            }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error: ErrorResponse = response.json();
        assert_eq!(error.code, "CONFLICT");
        assert!(!error.success);

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "jane@example.com", "password": "password123" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        let token = format!("Bearer {}", body.data["token"].as_str().unwrap());
        let user_id = body.data["user"]["id"].as_str().unwrap().to_string();

        let response = server
            .get(&format!("/api/users/profile/{}", user_id))
            .add_header(AUTHORIZATION, auth(&token))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "jane@example.com", "password": "wrong-password" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let (app, _) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "full_name": "Jo",
                "email": "not-an-email",
                "password": "123"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_role_gates() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let student = create_test_user(&state.db, "student@example.com", Role::Student).await;

        // No token
        let response = server
            .post("/api/hostels")
            .json(&json!({
                "name": "Sunrise",
                "campus": "Main Campus",
                "address": "12 College Road",
                "policy": "Mixed"
            }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        // Garbage token
        let response = server
            .get("/api/users/admin/all-users")
            .add_header(AUTHORIZATION, auth("Bearer not-a-token"))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        // Wrong role
        let token = bearer(&state, &student);
        let response = server
            .post("/api/hostels")
            .add_header(AUTHORIZATION, auth(&token))
            .json(&json!({
                "name": "Sunrise",
                "campus": "Main Campus",
                "address": "12 College Road",
                "policy": "Mixed"
            }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let error: ErrorResponse = response.json();
        assert_eq!(error.code, "FORBIDDEN");

        let response = server
            .get("/api/users/admin/all-users")
            .add_header(AUTHORIZATION, auth(&token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_hostel_listing_and_duplicate() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let owner = create_test_user(&state.db, "owner@example.com", Role::Owner).await;
        let token = bearer(&state, &owner);

        let hostel = create_hostel(&server, &token, "Sunrise").await;
        assert_eq!(hostel["owner_id"], owner.id.to_string());
        assert_eq!(hostel["is_verified"], false);

        let response = server
            .post("/api/hostels")
            .add_header(AUTHORIZATION, auth(&token))
            .json(&json!({
                "name": "Sunrise",
                "campus": "Main Campus",
                "address": "Sunrise Road, Westlands",
                "policy": "Mixed"
            }))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        create_hostel(&server, &token, "Hill View").await;

        let response = server.get("/api/hostels").add_query_param("search", "Hill").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["name"], "Hill View");

        let response = server
            .get(&format!("/api/hostels/{}", uuid::Uuid::new_v4()))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_booking_drives_room_occupancy() {
        let _guard = init_test_tracing();
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let owner = create_test_user(&state.db, "owner@example.com", Role::Owner).await;
        let first = create_test_user(&state.db, "first@example.com", Role::Student).await;
        let second = create_test_user(&state.db, "second@example.com", Role::Student).await;
        let third = create_test_user(&state.db, "third@example.com", Role::Student).await;
        let owner_token = bearer(&state, &owner);

        let hostel = create_hostel(&server, &owner_token, "Sunrise").await;
        let hostel_id = hostel["id"].as_str().unwrap().to_string();
        let room = create_room(&server, &owner_token, &hostel_id, 2).await;
        let room_id = room["id"].as_str().unwrap().to_string();
        assert_eq!(room["occupied_slots"], 0);
        assert_eq!(room["status"], "Available");

        let response = server
            .post("/api/bookings")
            .add_header(AUTHORIZATION, auth(&bearer(&state, &first)))
            .json(&json!({ "room_id": room_id }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let first_booking: ApiResponse<Value> = response.json();
        assert_eq!(first_booking.data["status"], "Pending");

        let response = server
            .post("/api/bookings")
            .add_header(AUTHORIZATION, auth(&bearer(&state, &second)))
            .json(&json!({ "room_id": room_id }))
            .await;
        response.assert_status(StatusCode::CREATED);

        // Room is now full
        let response = server.get(&format!("/api/rooms/available/{}", hostel_id)).await;
        let body: ApiResponse<Vec<Value>> = response.json();
        assert!(body.data.is_empty());

        let response = server
            .post("/api/bookings")
            .add_header(AUTHORIZATION, auth(&bearer(&state, &third)))
            .json(&json!({ "room_id": room_id }))
            .await;
        response.assert_status(StatusCode::PRECONDITION_FAILED);
        let error: ErrorResponse = response.json();
        assert_eq!(error.code, "PRECONDITION_FAILED");

        let response = server
            .get(&format!("/api/rooms/stats/{}", hostel_id))
            .add_header(AUTHORIZATION, auth(&owner_token))
            .await;
        response.assert_status(StatusCode::OK);
        let stats: ApiResponse<Value> = response.json();
        assert_eq!(stats.data["room_count"], 1);
        assert_eq!(stats.data["total_capacity"], 2);
        assert_eq!(stats.data["total_occupied"], 2);

        // Someone else's booking cannot be cancelled by a student
        let booking_id = first_booking.data["id"].as_str().unwrap().to_string();
        let response = server
            .patch(&format!("/api/bookings/{}/cancel", booking_id))
            .add_header(AUTHORIZATION, auth(&bearer(&state, &third)))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .patch(&format!("/api/bookings/{}/cancel", booking_id))
            .add_header(AUTHORIZATION, auth(&bearer(&state, &first)))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get(&format!("/api/rooms/list/{}", hostel_id))
            .add_header(AUTHORIZATION, auth(&owner_token))
            .await;
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data[0]["occupied_slots"], 1);
        assert_eq!(body.data[0]["status"], "Available");

        // Shrinking to the current occupancy fills the room
        let response = server
            .patch(&format!("/api/rooms/{}/{}", hostel_id, room_id))
            .add_header(AUTHORIZATION, auth(&owner_token))
            .json(&json!({ "total_slots": 1 }))
            .await;
        response.assert_status(StatusCode::OK);
        let updated: ApiResponse<Value> = response.json();
        assert_eq!(updated.data["status"], "Full");

        let response = server
            .get("/api/bookings/mine")
            .add_header(AUTHORIZATION, auth(&bearer(&state, &first)))
            .await;
        let mine: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(mine.data.len(), 1);
        assert_eq!(mine.data[0]["status"], "Cancelled");
    }

    #[tokio::test]
    async fn test_maintenance_blocks_booking() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let owner = create_test_user(&state.db, "owner@example.com", Role::Owner).await;
        let student = create_test_user(&state.db, "student@example.com", Role::Student).await;
        let owner_token = bearer(&state, &owner);

        let hostel = create_hostel(&server, &owner_token, "Sunrise").await;
        let hostel_id = hostel["id"].as_str().unwrap().to_string();
        let room = create_room(&server, &owner_token, &hostel_id, 3).await;
        let room_id = room["id"].as_str().unwrap().to_string();

        let response = server
            .patch(&format!("/api/rooms/status/{}", room_id))
            .add_header(AUTHORIZATION, auth(&owner_token))
            .json(&json!({ "status": "Maintenance" }))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .post("/api/bookings")
            .add_header(AUTHORIZATION, auth(&bearer(&state, &student)))
            .json(&json!({ "room_id": room_id }))
            .await;
        response.assert_status(StatusCode::PRECONDITION_FAILED);

        // A manual Full sticks even on an empty room
        let response = server
            .patch(&format!("/api/rooms/status/{}", room_id))
            .add_header(AUTHORIZATION, auth(&owner_token))
            .json(&json!({ "status": "Full" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["status"], "Full");
        assert_eq!(body.data["occupied_slots"], 0);

        let response = server.get(&format!("/api/rooms/available/{}", hostel_id)).await;
        let available: ApiResponse<Vec<Value>> = response.json();
        assert!(available.data.is_empty());
    }

    #[tokio::test]
    async fn test_gallery_thumbnail_follows_deletes() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let owner = create_test_user(&state.db, "owner@example.com", Role::Owner).await;
        let caretaker = create_test_user(&state.db, "care@example.com", Role::Caretaker).await;
        let owner_token = bearer(&state, &owner);

        let hostel = create_hostel(&server, &owner_token, "Sunrise").await;
        let hostel_id = hostel["id"].as_str().unwrap().to_string();

        let response = server
            .post("/api/media")
            .add_header(AUTHORIZATION, auth(&owner_token))
            .json(&json!({
                "hostel_id": hostel_id,
                "items": [
                    { "url": "https://cdn.example.com/front.jpg", "media_type": "Image" },
                    { "url": "https://cdn.example.com/lobby.jpg", "media_type": "Image", "is_thumbnail": true }
                ]
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let added: ApiResponse<Vec<Value>> = response.json();
        let first_id = added.data[0]["id"].as_str().unwrap().to_string();
        let second_id = added.data[1]["id"].as_str().unwrap().to_string();

        let response = server.get(&format!("/api/media/{}", hostel_id)).await;
        let gallery: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(gallery.data.len(), 2);
        assert_eq!(gallery.data[0]["id"], second_id.as_str());
        assert_eq!(gallery.data[0]["is_thumbnail"], true);
        assert_eq!(gallery.data[1]["id"], first_id.as_str());
        assert_eq!(gallery.data[1]["is_thumbnail"], false);

        // Caretakers may upload but not delete
        let response = server
            .delete(&format!("/api/media/{}/{}", hostel_id, second_id))
            .add_header(AUTHORIZATION, auth(&bearer(&state, &caretaker)))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .delete(&format!("/api/media/{}/{}", hostel_id, second_id))
            .add_header(AUTHORIZATION, auth(&owner_token))
            .await;
        response.assert_status(StatusCode::OK);
        let deleted: ApiResponse<Value> = response.json();
        assert_eq!(deleted.data["promoted"]["id"], first_id.as_str());

        // The cached gallery was dropped by the delete
        let response = server.get(&format!("/api/media/{}", hostel_id)).await;
        let gallery: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(gallery.data.len(), 1);
        assert_eq!(gallery.data[0]["id"], first_id.as_str());
        assert_eq!(gallery.data[0]["is_thumbnail"], true);

        let response = server
            .delete(&format!("/api/media/{}/{}", hostel_id, first_id))
            .add_header(AUTHORIZATION, auth(&owner_token))
            .await;
        response.assert_status(StatusCode::OK);
        let response = server.get(&format!("/api/media/{}", hostel_id)).await;
        let gallery: ApiResponse<Vec<Value>> = response.json();
        assert!(gallery.data.is_empty());
    }

    #[tokio::test]
    async fn test_identity_verification_flow() {
        let _guard = init_test_tracing();
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let admin = create_test_user(&state.db, "admin@example.com", Role::Admin).await;
        let applicant = create_test_user(&state.db, "applicant@example.com", Role::Student).await;
        let admin_token = bearer(&state, &admin);
        let applicant_token = bearer(&state, &applicant);

        let response = server
            .post("/api/users/submit-id")
            .add_header(AUTHORIZATION, auth(&applicant_token))
            .json(&json!({
                "id_number": "12345678",
                "id_front_image_url": "https://cdn.example.com/id-front.jpg",
                "id_back_image_url": "https://cdn.example.com/id-back.jpg",
                "passport_image_url": "https://cdn.example.com/passport.jpg"
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["identity_verification_status"], "PENDING");

        let response = server
            .get("/api/users/admin/pending")
            .add_header(AUTHORIZATION, auth(&admin_token))
            .await;
        let queue: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(queue.data.len(), 1);
        assert_eq!(queue.data[0]["id_number"], "12345678");

        let verify_path = format!("/api/users/admin/verify-user/{}", applicant.id);
        let response = server
            .patch(&verify_path)
            .add_header(AUTHORIZATION, auth(&admin_token))
            .json(&json!({ "status": "APPROVED", "target_role": "Owner" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["role"], "Owner");
        assert_eq!(body.data["is_identity_verified"], true);
        assert_eq!(body.data["verification_remarks"], "Verified via Admin");

        let response = server
            .patch(&verify_path)
            .add_header(AUTHORIZATION, auth(&admin_token))
            .json(&json!({ "status": "REJECTED", "target_role": "Owner", "remarks": "Blurry photo" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["role"], "Student");
        assert_eq!(body.data["is_identity_verified"], false);
        assert_eq!(body.data["identity_verification_status"], "REJECTED");

        // PENDING is not a decision
        let response = server
            .patch(&verify_path)
            .add_header(AUTHORIZATION, auth(&admin_token))
            .json(&json!({ "status": "PENDING", "target_role": "Owner" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_caretaker_needs_owner_link() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let admin = create_test_user(&state.db, "admin@example.com", Role::Admin).await;
        let owner = create_test_user(&state.db, "owner@example.com", Role::Owner).await;
        let helper = create_test_user(&state.db, "helper@example.com", Role::Student).await;
        let admin_token = bearer(&state, &admin);
        let owner_token = bearer(&state, &owner);

        let verify_path = format!("/api/users/admin/verify-user/{}", helper.id);
        let response = server
            .patch(&verify_path)
            .add_header(AUTHORIZATION, auth(&admin_token))
            .json(&json!({ "status": "APPROVED", "target_role": "Caretaker" }))
            .await;
        response.assert_status(StatusCode::PRECONDITION_FAILED);
        let error: ErrorResponse = response.json();
        assert_eq!(error.error, "Caretaker must be linked to an Owner first");

        let response = server
            .post("/api/users/claim-staff")
            .add_header(AUTHORIZATION, auth(&owner_token))
            .json(&json!({ "email": "helper@example.com" }))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get("/api/users/my-staff")
            .add_header(AUTHORIZATION, auth(&owner_token))
            .await;
        let staff: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(staff.data.len(), 1);
        assert_eq!(staff.data[0]["email"], "helper@example.com");

        let response = server
            .patch(&verify_path)
            .add_header(AUTHORIZATION, auth(&admin_token))
            .json(&json!({ "status": "APPROVED", "target_role": "Caretaker" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["role"], "Caretaker");
        assert_eq!(body.data["managed_by"], owner.id.to_string());
    }

    #[tokio::test]
    async fn test_reviews_one_per_user() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let owner = create_test_user(&state.db, "owner@example.com", Role::Owner).await;
        let student = create_test_user(&state.db, "student@example.com", Role::Student).await;
        let student_token = bearer(&state, &student);

        let hostel = create_hostel(&server, &bearer(&state, &owner), "Sunrise").await;
        let hostel_id = hostel["id"].as_str().unwrap().to_string();

        let review = json!({ "hostel_id": hostel_id, "rating": 4, "title": "Quiet" });
        let response = server
            .post("/api/reviews")
            .add_header(AUTHORIZATION, auth(&student_token))
            .json(&review)
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/reviews")
            .add_header(AUTHORIZATION, auth(&student_token))
            .json(&review)
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error: ErrorResponse = response.json();
        assert_eq!(error.error, "You have already reviewed this hostel");

        let response = server
            .post("/api/reviews")
            .add_header(AUTHORIZATION, auth(&student_token))
            .json(&json!({ "hostel_id": hostel_id, "rating": 9 }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server.get(&format!("/api/reviews/hostel/{}", hostel_id)).await;
        let reviews: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(reviews.data.len(), 1);

        let response = server.get(&format!("/api/reviews/stats/{}", hostel_id)).await;
        let summary: ApiResponse<Value> = response.json();
        assert_eq!(summary.data["total_reviews"], 1);
        let average: Decimal = summary.data["average_rating"].as_str().unwrap().parse().unwrap();
        assert_eq!(average, Decimal::from(4));
    }

    #[tokio::test]
    async fn test_verified_listings_and_owner_replies() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let admin = create_test_user(&state.db, "admin@example.com", Role::Admin).await;
        let owner = create_test_user(&state.db, "owner@example.com", Role::Owner).await;
        let rival = create_test_user(&state.db, "rival@example.com", Role::Owner).await;
        let student = create_test_user(&state.db, "student@example.com", Role::Student).await;
        let owner_token = bearer(&state, &owner);

        let hostel = create_hostel(&server, &owner_token, "Sunrise").await;
        let hostel_id = hostel["id"].as_str().unwrap().to_string();
        create_hostel(&server, &owner_token, "Hill View").await;

        let verify_path = format!("/api/hostels/verify/{}", hostel_id);
        server
            .patch(&verify_path)
            .add_header(AUTHORIZATION, auth(&owner_token))
            .json(&json!({ "is_verified": true }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let response = server
            .patch(&verify_path)
            .add_header(AUTHORIZATION, auth(&bearer(&state, &admin)))
            .json(&json!({ "is_verified": true }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["is_verified"], true);

        let response = server.get("/api/hostels").add_query_param("is_verified", "true").await;
        let verified: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(verified.data.len(), 1);
        assert_eq!(verified.data[0]["name"], "Sunrise");

        let response = server
            .post("/api/reviews")
            .add_header(AUTHORIZATION, auth(&bearer(&state, &student)))
            .json(&json!({ "hostel_id": hostel_id, "rating": 3, "comment": "Noisy at night" }))
            .await;
        let review: ApiResponse<Value> = response.json();
        let reply_path = format!("/api/reviews/reply/{}", review.data["id"].as_str().unwrap());

        // Another owner's hostel
        server
            .patch(&reply_path)
            .add_header(AUTHORIZATION, auth(&bearer(&state, &rival)))
            .json(&json!({ "owner_reply": "Not ours" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .patch(&reply_path)
            .add_header(AUTHORIZATION, auth(&owner_token))
            .json(&json!({ "owner_reply": "" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .patch(&reply_path)
            .add_header(AUTHORIZATION, auth(&owner_token))
            .json(&json!({ "owner_reply": "Quiet hours now start at 10pm" }))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server.get(&format!("/api/reviews/hostel/{}", hostel_id)).await;
        let reviews: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(reviews.data[0]["owner_reply"], "Quiet hours now start at 10pm");
        assert!(reviews.data[0]["replied_at"].is_string());
    }

    #[tokio::test]
    async fn test_admin_moderation() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let admin = create_test_user(&state.db, "admin@example.com", Role::Admin).await;
        let student = create_test_user(&state.db, "student@example.com", Role::Student).await;
        let admin_token = bearer(&state, &admin);

        let response = server
            .patch(&format!("/api/users/admin/account-status/{}", student.id))
            .add_header(AUTHORIZATION, auth(&admin_token))
            .json(&json!({ "status": "SUSPENDED" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["account_status"], "SUSPENDED");

        let response = server
            .patch(&format!("/api/users/admin/update-user/{}", student.id))
            .add_header(AUTHORIZATION, auth(&admin_token))
            .json(&json!({ "email_verified": true, "bio": "Checked by support" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["email_verified"], true);
        assert_eq!(body.data["bio"], "Checked by support");

        let response = server
            .get("/api/users/admin/stats")
            .add_header(AUTHORIZATION, auth(&admin_token))
            .await;
        let stats: ApiResponse<Value> = response.json();
        assert_eq!(stats.data["Admin"], 1);
        assert_eq!(stats.data["Student"], 1);

        let response = server
            .delete(&format!("/api/users/admin/delete/{}", student.id))
            .add_header(AUTHORIZATION, auth(&admin_token))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get("/api/users/admin/all-users")
            .add_header(AUTHORIZATION, auth(&admin_token))
            .await;
        let users: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(users.data.len(), 1);
    }

    #[tokio::test]
    async fn test_private_profile_hidden_from_others() {
        let (app, state) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();
        let shy = create_test_user(&state.db, "shy@example.com", Role::Student).await;
        let nosy = create_test_user(&state.db, "nosy@example.com", Role::Student).await;
        let shy_token = bearer(&state, &shy);

        let response = server
            .patch("/api/users/update-me")
            .add_header(AUTHORIZATION, auth(&shy_token))
            .json(&json!({ "visibility": "PRIVATE", "bio": "Second year" }))
            .await;
        response.assert_status(StatusCode::OK);

        let path = format!("/api/users/profile/{}", shy.id);
        server
            .get(&path)
            .add_header(AUTHORIZATION, auth(&bearer(&state, &nosy)))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let response = server.get(&path).add_header(AUTHORIZATION, auth(&shy_token)).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["bio"], "Second year");
    }

    #[tokio::test]
    async fn test_metrics_disabled_in_tests() {
        let (app, _) = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // The test config turns the Prometheus recorder off
        server.get("/metrics").await.assert_status(StatusCode::NOT_FOUND);
    }
}
