// Diesel table definitions, kept in sync with `DbContext::init_schema`.

diesel::table! {
    document (id) {
        id -> Integer,
        title -> Text,
        content -> Binary,
        content_type -> Text,
    }
}

diesel::table! {
    place (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    place_alternate_name (id) {
        id -> Integer,
        place_id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    person (id) {
        id -> Integer,
        name -> Text,
        time_range -> Nullable<Text>,
    }
}

diesel::table! {
    religion (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    place_instance (id) {
        id -> Integer,
        place_id -> Integer,
    }
}

diesel::table! {
    person_instance (id) {
        id -> Integer,
        person_id -> Integer,
    }
}

diesel::table! {
    religion_instance (id) {
        id -> Integer,
        religion_id -> Integer,
    }
}

diesel::table! {
    time_group (id) {
        id -> Integer,
        document_id -> Integer,
    }
}

diesel::table! {
    annotation (id) {
        id -> Integer,
        document_id -> Integer,
        span_start -> Integer,
        span_end -> Integer,
        place_instance_id -> Nullable<Integer>,
        person_instance_id -> Nullable<Integer>,
        religion_instance_id -> Nullable<Integer>,
        time_group_id -> Nullable<Integer>,
    }
}

diesel::table! {
    annotation_suggestion (id) {
        id -> Integer,
        document_id -> Integer,
        span_start -> Integer,
        span_end -> Integer,
        source -> Text,
        #[sql_name = "type"]
        entity_type -> Text,
        entity_id -> Integer,
        score -> Double,
    }
}

diesel::table! {
    annotation_suggestion_document_state (document_id) {
        document_id -> Integer,
        suggestion_hash -> Text,
        updated_at -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    document,
    place,
    place_alternate_name,
    person,
    religion,
    place_instance,
    person_instance,
    religion_instance,
    time_group,
    annotation,
    annotation_suggestion,
    annotation_suggestion_document_state,
);
