diesel::table! {
    employees (id) {
        id -> Uuid,
        organization_id -> Uuid,
        user_id -> Nullable<Uuid>,
        first_name -> Varchar,
        last_name -> Varchar,
        email -> Nullable<Varchar>,
        job_title -> Nullable<Varchar>,
        department -> Varchar,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    tasks (id) {
        id -> Uuid,
        organization_id -> Uuid,
        title -> Varchar,
        description -> Nullable<Text>,
        department -> Varchar,
        zone -> Varchar,
        priority -> Varchar,
        assignee_id -> Nullable<Uuid>,
        due_date -> Nullable<Timestamptz>,
        created_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> employees (assignee_id));
