use crate::server::ServerError;
use axum::{
    Form as AxumForm,
    extract::{
        FromRequest, FromRequestParts, Query as AxumQuery, Request, rejection::FormRejection,
    },
};
use serde::Deserialize;

/// Urlencoded form body. A request without one yields `T::default()`, so the
/// form is re-rendered with its field errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Form<T>(pub T);

impl<S, T> FromRequest<S> for Form<T>
where
    AxumForm<T>: FromRequest<S, Rejection = FormRejection>,
    T: Default,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumForm::<T>::from_request(req, state).await {
            Ok(AxumForm(value)) => Ok(Self(value)),
            Err(FormRejection::InvalidFormContentType(_)) => Ok(Self(T::default())),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

#[derive(FromRequestParts, Debug, Clone, Copy, Default)]
#[from_request(via(AxumQuery), rejection(ServerError))]
pub struct Query<T>(pub T);

/// The `?page=` parameter of a listing, kept raw so that the paginator can
/// resolve malformed values itself. When repeated, the last value wins.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
#[serde(from = "Vec<(String, String)>")]
pub struct PageQuery {
    pub page: Option<String>,
}

impl From<Vec<(String, String)>> for PageQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let page = pairs
            .into_iter()
            .rev()
            .find_map(|(key, value)| (key == "page").then_some(value));

        Self { page }
    }
}

impl PageQuery {
    #[must_use]
    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }
}
