table! {
    users (user_id) {
        user_id -> Uuid,
        name -> Text,
        email -> Text,
        password_hash -> Text,
        role -> Text,
        created_at -> Timestamptz,
    }
}

table! {
    sessions (token) {
        token -> Text,
        user_id -> Uuid,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
        revoked_at -> Nullable<Timestamptz>,
    }
}

table! {
    subscriptions (id) {
        id -> Uuid,
        user_id -> Uuid,
        name -> Text,
        price -> Float8,
        currency -> Text,
        frequency -> Text,
        category -> Text,
        payment_method -> Text,
        status -> Text,
        start_date -> Date,
        renewal_date -> Date,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

joinable!(sessions -> users (user_id));
joinable!(subscriptions -> users (user_id));

allow_tables_to_appear_in_same_query!(users, sessions, subscriptions);
