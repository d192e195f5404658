use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use async_trait::async_trait;
use sea_orm::prelude::*;

use sea_orm::Iterable;


pub async fn load_many<E, Conn>(db: &Conn, uuids: Vec<Uuid>) -> Result<Vec<Option<E::Model>>, DbErr> where E: EntityTrait, Conn: ConnectionTrait {
    let keys : Vec<E::Column> = E::PrimaryKey::iter().map(|k| k.into_column()).collect();

    if keys.len() != 1 {
        panic!("load_many only supports entities with a single primary key");
    }

    let key = keys[0];

    let models = E::find().filter(key.is_in(uuids.clone())).all(db).await?;

    let positions : HashMap<Uuid, usize> = models.iter().enumerate().map(|(i, model)| {
        match model.get(key) {
            sea_orm::Value::Uuid(Some(val)) => (*val, i),
            _ => panic!("load_many only supports uuid primary keys")
        }
    }).collect();

    let mut out = vec![];

    for uuid in uuids {
        match positions.get(&uuid) {
            Some(pos) => {
                out.push(Some(models[*pos].clone()));
            },
            None => {
                out.push(None);
            }
        }
    }

    Ok(out)
}

#[derive(Debug)]
pub enum BatchLoadError {
    RowNotFound,
    DbErr(DbErr)
}

impl Display for BatchLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<DbErr> for BatchLoadError {
    fn from(err: DbErr) -> Self {
        BatchLoadError::DbErr(err)
    }
}

impl Error for BatchLoadError {}


#[async_trait]
pub trait BatchLoad {
    type M: Send;

    async fn batch_load<Conn>(db: &Conn, uuids: Vec<Uuid>) -> Result<Vec<Option<Self::M>>, DbErr> where Conn: ConnectionTrait;

    async fn batch_load_all<Conn>(db: &Conn, uuids: Vec<Uuid>) -> Result<Vec<Self::M>, BatchLoadError> where Conn: ConnectionTrait {
        let results = Self::batch_load(db, uuids).await?;

        results.into_iter().map(|d| {
            d.ok_or(BatchLoadError::RowNotFound)
        }).collect::<Result<Vec<_>, _>>()
    }
}

#[async_trait]
impl<E: EntityTrait> BatchLoad for E {
    type M = E::Model;

    async fn batch_load<Conn>(db: &Conn, uuids: Vec<Uuid>) -> Result<Vec<Option<Self::M>>, DbErr> where Conn: ConnectionTrait {
        load_many::<E, Conn>(db, uuids).await
    }
}
