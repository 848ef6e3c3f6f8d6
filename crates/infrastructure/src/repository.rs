use std::sync::Arc;

use domain::{
    MessageKind, MessageRecord, MessageRepository, NewMessage, Participant, ParticipantName,
    ParticipantRepository, RepositoryError, RepositoryFuture,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use time::OffsetDateTime;

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::storage(err.to_string())
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

#[derive(Debug, FromRow)]
struct ParticipantRow {
    name: String,
    last_seen: OffsetDateTime,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = RepositoryError;

    fn try_from(value: ParticipantRow) -> Result<Self, Self::Error> {
        let name = ParticipantName::parse(value.name).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Participant::register(name, value.last_seen))
    }
}

#[derive(Debug, FromRow)]
struct MessageRow {
    seq: i64,
    sender: String,
    recipient: String,
    body: String,
    kind: String,
    sent_time: String,
}

impl TryFrom<MessageRow> for MessageRecord {
    type Error = RepositoryError;

    fn try_from(value: MessageRow) -> Result<Self, Self::Error> {
        let kind = value
            .kind
            .parse::<MessageKind>()
            .map_err(|err| invalid_data(err.to_string()))?;
        let seq = u64::try_from(value.seq)
            .map_err(|_| invalid_data(format!("negative message seq {}", value.seq)))?;
        Ok(MessageRecord {
            seq,
            from: value.sender,
            to: value.recipient,
            text: value.body,
            kind,
            time: value.sent_time,
        })
    }
}

async fn insert_message<'e, E>(
    executor: E,
    message: &NewMessage,
) -> Result<MessageRecord, RepositoryError>
where
    E: sqlx::PgExecutor<'e>,
{
    let record = sqlx::query_as::<_, MessageRow>(
        r#"
        INSERT INTO messages (sender, recipient, body, kind, sent_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING seq, sender, recipient, body, kind, sent_time
        "#,
    )
    .bind(&message.from)
    .bind(&message.to)
    .bind(&message.text)
    .bind(message.kind.as_str())
    .bind(&message.time)
    .fetch_one(executor)
    .await
    .map_err(map_sqlx_err)?;

    MessageRecord::try_from(record)
}

#[derive(Clone)]
pub struct PgParticipantRepository {
    pool: PgPool,
}

impl PgParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ParticipantRepository for PgParticipantRepository {
    fn insert_if_absent(
        &self,
        participant: Participant,
        announcement: NewMessage,
    ) -> RepositoryFuture<Option<MessageRecord>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await.map_err(map_sqlx_err)?;

            let inserted = sqlx::query(
                r#"
                INSERT INTO participants (name, last_seen)
                VALUES ($1, $2)
                ON CONFLICT (name) DO NOTHING
                "#,
            )
            .bind(participant.name.as_str())
            .bind(participant.last_seen)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

            if inserted.rows_affected() == 0 {
                tx.rollback().await.map_err(map_sqlx_err)?;
                return Ok(None);
            }

            let record = insert_message(&mut *tx, &announcement).await?;
            tx.commit().await.map_err(map_sqlx_err)?;
            Ok(Some(record))
        })
    }

    fn find_by_name(&self, name: String) -> RepositoryFuture<Option<Participant>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, ParticipantRow>(
                r#"SELECT name, last_seen FROM participants WHERE name = $1"#,
            )
            .bind(name)
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            record.map(Participant::try_from).transpose()
        })
    }

    fn list(&self) -> RepositoryFuture<Vec<Participant>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let records = sqlx::query_as::<_, ParticipantRow>(
                r#"SELECT name, last_seen FROM participants ORDER BY id ASC"#,
            )
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            records.into_iter().map(Participant::try_from).collect()
        })
    }
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl MessageRepository for PgMessageRepository {
    fn append(&self, message: NewMessage) -> RepositoryFuture<MessageRecord> {
        let pool = self.pool.clone();
        Box::pin(async move { insert_message(&pool, &message).await })
    }

    fn list_all(&self) -> RepositoryFuture<Vec<MessageRecord>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let records = sqlx::query_as::<_, MessageRow>(
                r#"
                SELECT seq, sender, recipient, body, kind, sent_time
                FROM messages
                ORDER BY seq ASC
                "#,
            )
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            records.into_iter().map(MessageRecord::try_from).collect()
        })
    }
}

#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
    pub participant_repository: Arc<PgParticipantRepository>,
    pub message_repository: Arc<PgMessageRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            participant_repository: Arc::new(PgParticipantRepository::new(pool.clone())),
            message_repository: Arc::new(PgMessageRepository::new(pool.clone())),
            pool,
        }
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
