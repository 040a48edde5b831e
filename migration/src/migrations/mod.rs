pub mod m202602010001_create_users;
pub mod m202602010002_create_activities;
pub mod m202602010003_create_registrations;
pub mod m202602080001_create_tasks;
pub mod m202602150001_create_submissions;
