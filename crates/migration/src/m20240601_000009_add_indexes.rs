use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Businesses: listing by owner and by category
        manager
            .create_index(
                Index::create()
                    .name("idx_business_owner")
                    .table(Businesses::Table)
                    .col(Businesses::OwnerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_business_category")
                    .table(Businesses::Table)
                    .col(Businesses::CategoryId)
                    .col(Businesses::IsActive)
                    .to_owned(),
            )
            .await?;

        // Likes: lookup of (business, user); not unique
        manager
            .create_index(
                Index::create()
                    .name("idx_business_like_pair")
                    .table(BusinessLikes::Table)
                    .col(BusinessLikes::BusinessId)
                    .col(BusinessLikes::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_business_comment_business")
                    .table(BusinessComments::Table)
                    .col(BusinessComments::BusinessId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_business")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::BusinessId)
                    .to_owned(),
            )
            .await?;

        // Messages: conversation reads go by business then participants
        manager
            .create_index(
                Index::create()
                    .name("idx_message_business")
                    .table(Messages::Table)
                    .col(Messages::BusinessId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_message_receiver")
                    .table(Messages::Table)
                    .col(Messages::ReceiverId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notification_user")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::IsRead)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_notification_user").table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_message_receiver").table(Messages::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_message_business").table(Messages::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_subscription_business").table(Subscriptions::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_business_comment_business")
                    .table(BusinessComments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_business_like_pair").table(BusinessLikes::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_business_category").table(Businesses::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_business_owner").table(Businesses::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Businesses { Table, OwnerId, CategoryId, IsActive }

#[derive(DeriveIden)]
enum BusinessLikes { Table, BusinessId, UserId }

#[derive(DeriveIden)]
enum BusinessComments { Table, BusinessId }

#[derive(DeriveIden)]
enum Subscriptions { Table, BusinessId }

#[derive(DeriveIden)]
enum Messages { Table, BusinessId, ReceiverId }

#[derive(DeriveIden)]
enum Notifications { Table, UserId, IsRead }
