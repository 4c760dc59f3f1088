use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, Set};
use wherecraft::{EntityMetadata, FieldType};

pub mod user {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "user")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
        #[sea_orm(unique)]
        pub email: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Metadata matching the `user` entity above
pub fn user_metadata() -> EntityMetadata {
    EntityMetadata::builder("User", "user")
        .primary_key("id", FieldType::String)
        .field("name", FieldType::String)
        .field("email", FieldType::String)
        .build()
        .unwrap()
}

pub async fn setup_test_db() -> DatabaseConnection {
    init_logger();
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(user::Entity)))
        .await
        .unwrap();
    db
}

#[allow(dead_code)]
pub async fn create_user(db: &DatabaseConnection, id: &str, name: &str, email: &str) {
    user::Entity::insert(user::ActiveModel {
        id: Set(id.to_owned()),
        name: Set(name.to_owned()),
        email: Set(email.to_owned()),
    })
    .exec(db)
    .await
    .unwrap();
}
