//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// User who created the task.
        creator_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Free-form notes.
        notes -> Nullable<Text>,
        /// Task lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Task priority.
        #[max_length = 50]
        priority -> Varchar,
        /// Optional deadline.
        due_date -> Nullable<Timestamptz>,
        /// Optional owning group.
        group_id -> Nullable<Uuid>,
        /// Optional category.
        category_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Assignment rows linking tasks to users.
    task_assignments (id) {
        /// Assignment identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Assigned user.
        user_id -> Uuid,
        /// Assignment timestamp.
        assigned_at -> Timestamptz,
    }
}

diesel::table! {
    /// User directory, read for existence checks only.
    users (id) {
        /// User identifier.
        id -> Uuid,
    }
}

diesel::table! {
    /// Study group directory, read for existence checks only.
    study_groups (id) {
        /// Group identifier.
        id -> Uuid,
    }
}

diesel::table! {
    /// Category directory, read for existence checks only.
    categories (id) {
        /// Category identifier.
        id -> Uuid,
    }
}

diesel::joinable!(task_assignments -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_assignments);
