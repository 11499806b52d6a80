use sqlx::PgPool;
use tracing::debug;

use crate::cache::{cache_key, CacheGateway};
use crate::database::manager::DatabaseError;
use crate::database::query_builder::{bind_query, bind_query_as, delete_sql, find_sql, insert_sql, update_sql, QueryBuilder};
use crate::database::schema::Entity;
use crate::filter::{ListParams, Paginated, Pagination};

/// CRUD plus cached paginated listing for one entity type
pub struct Repository<E: Entity> {
    pool: PgPool,
    cache: CacheGateway,
    _phantom: std::marker::PhantomData<E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(pool: PgPool, cache: CacheGateway) -> Self {
        Self {
            pool,
            cache,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Cache first; on a miss, count and fetch through the same filter, then
    /// store exactly what is returned.
    pub async fn list(
        &self,
        params: &ListParams,
        raw_query: Option<&str>,
        max_limit: Option<i64>,
    ) -> Result<Paginated<E::Record>, DatabaseError> {
        // invalid status/sort fail before the cache is consulted
        let builder = QueryBuilder::<E::Record>::new(E::schema())?.filter(params, max_limit)?;

        let key = cache_key(&E::schema().cache_prefix(), raw_query);
        if let Some(cached) = self.cache.get_json::<Paginated<E::Record>>(&key).await {
            return Ok(cached);
        }

        let total_items = builder.count(&self.pool).await?;
        let mut data = builder.select_all(&self.pool).await?;
        E::decorate(&self.pool, &mut data).await?;

        let page = Paginated {
            data,
            pagination: Pagination::calculate(total_items, builder.page()),
        };
        self.cache.set_json(&key, &page).await;
        Ok(page)
    }

    pub async fn find(&self, id: i64) -> Result<E::Record, DatabaseError> {
        let sql = find_sql(E::schema(), id);
        bind_query_as(sqlx::query_as::<_, E::Record>(&sql.query), &sql.params)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(E::schema().not_found_message()))
    }

    pub async fn create(&self, input: &E::Create) -> Result<E::Record, DatabaseError> {
        let sql = insert_sql(E::schema(), E::create_values(input)?);

        let mut tx = self.pool.begin().await?;
        let record = bind_query_as(sqlx::query_as::<_, E::Record>(&sql.query), &sql.params)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        self.invalidate().await;
        Ok(record)
    }

    /// Reads the current row and writes the merged patch in one transaction
    pub async fn update(&self, id: i64, patch: &E::Update) -> Result<E::Record, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let current_sql = find_sql(E::schema(), id);
        let mut query = current_sql.query;
        query.push_str(" FOR UPDATE");
        let current = bind_query_as(sqlx::query_as::<_, E::Record>(&query), &current_sql.params)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(E::schema().not_found_message()))?;

        let sql = update_sql(E::schema(), id, E::update_values(&current, patch)?);
        let record = bind_query_as(sqlx::query_as::<_, E::Record>(&sql.query), &sql.params)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(E::schema().not_found_message()))?;
        tx.commit().await?;

        self.invalidate().await;
        Ok(record)
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let sql = delete_sql(E::schema(), id);

        let mut tx = self.pool.begin().await?;
        let result = bind_query(sqlx::query(&sql.query), &sql.params)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(E::schema().not_found_message()));
        }
        tx.commit().await?;

        self.invalidate().await;
        Ok(())
    }

    /// Runs only after a successful commit
    async fn invalidate(&self) {
        let patterns = E::schema().invalidation_patterns();
        debug!("invalidating {:?}", patterns);
        self.cache.invalidate(&patterns).await;
    }
}
