diesel::table! {
    companies (id) {
        id -> Uuid,
        organization_id -> Uuid,
        name -> Varchar,
        website -> Nullable<Varchar>,
        industry -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        address -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        country -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    contacts (id) {
        id -> Uuid,
        organization_id -> Uuid,
        company_id -> Nullable<Uuid>,
        first_name -> Varchar,
        last_name -> Varchar,
        email -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        job_title -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    opportunities (id) {
        id -> Uuid,
        organization_id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        stage -> Varchar,
        value -> Float8,
        currency -> Varchar,
        probability -> Int4,
        contact_id -> Nullable<Uuid>,
        company_id -> Nullable<Uuid>,
        owner_id -> Uuid,
        expected_close_date -> Nullable<Date>,
        closed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(contacts -> companies (company_id));
diesel::joinable!(opportunities -> contacts (contact_id));
diesel::joinable!(opportunities -> companies (company_id));
