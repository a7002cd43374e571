use crate::error::RecipeClientError;
use crate::{Attr, AttrKind, Recipe, RecipeClientTrait, RecipeDraft, User};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const TOKEN_FILE: &str = ".recipe_token";

#[derive(Clone)]
pub struct RecipeClientHttp {
    client: Arc<Client>,
    base_url: String,
    token: Option<String>,
    token_file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    image: Option<String>,
}

impl RecipeClientHttp {
    pub async fn connect(endpoint: &str) -> Result<Self, RecipeClientError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        Ok(Self {
            client: Arc::new(Client::builder().build()?),
            base_url,
            token: None,
            token_file: PathBuf::from(TOKEN_FILE),
        })
    }

    /// Stores the token in memory and in the token file so later runs reuse it.
    pub fn set_token(&mut self, token: String) -> Result<(), RecipeClientError> {
        fs::write(&self.token_file, &token)?;
        self.token = Some(token);
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn attr_url(kind: AttrKind) -> String {
        format!("/recipe/{}", kind.path())
    }

    fn auth_header(&self) -> Result<Option<reqwest::header::HeaderValue>, RecipeClientError> {
        let token = match &self.token {
            Some(t) if !t.is_empty() => t.clone(),
            _ => match fs::read_to_string(&self.token_file) {
                Ok(t) => t.trim().to_string(),
                Err(_) => return Ok(None),
            },
        };

        if token.is_empty() {
            return Ok(None);
        }

        let header = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| RecipeClientError::Unauthorized)?;
        Ok(Some(header))
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, RecipeClientError> {
        Ok(match self.auth_header()? {
            Some(h) => req.header(reqwest::header::AUTHORIZATION, h),
            None => req,
        })
    }

    async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T, RecipeClientError> {
        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            Err(RecipeClientError::from_http_response(resp).await)
        }
    }

    async fn expect_empty(resp: Response) -> Result<(), RecipeClientError> {
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(RecipeClientError::from_http_response(resp).await)
        }
    }
}

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait(?Send)]
impl RecipeClientTrait for RecipeClientHttp {
    async fn register(
        &mut self,
        email: String,
        password: String,
        name: String,
    ) -> Result<User, RecipeClientError> {
        let resp = self
            .client
            .post(self.url("/user/create/"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "name": name,
            }))
            .send()
            .await?;

        Self::parse(resp).await
    }

    async fn login(&mut self, email: String, password: String) -> Result<(), RecipeClientError> {
        let resp = self
            .client
            .post(self.url("/user/token/"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        let auth: AuthResponse = Self::parse(resp).await?;
        debug!("token received");
        self.set_token(auth.access_token)
    }

    async fn me(&mut self) -> Result<User, RecipeClientError> {
        let req = self.authorized(self.client.get(self.url("/user/me/")))?;
        Self::parse(req.send().await?).await
    }

    async fn update_me(
        &mut self,
        name: Option<String>,
        password: Option<String>,
    ) -> Result<User, RecipeClientError> {
        let req = self.authorized(self.client.patch(self.url("/user/me/")))?;
        let resp = req
            .json(&serde_json::json!({
                "name": name,
                "password": password,
            }))
            .send()
            .await?;
        Self::parse(resp).await
    }

    async fn list_attrs(
        &mut self,
        kind: AttrKind,
        assigned_only: bool,
    ) -> Result<Vec<Attr>, RecipeClientError> {
        let mut url = self.url(&format!("{}/", Self::attr_url(kind)));
        if assigned_only {
            url.push_str("?assigned_only=1");
        }
        let req = self.authorized(self.client.get(url))?;
        Self::parse(req.send().await?).await
    }

    async fn create_attr(&mut self, kind: AttrKind, name: String) -> Result<Attr, RecipeClientError> {
        let url = self.url(&format!("{}/", Self::attr_url(kind)));
        let req = self.authorized(self.client.post(url))?;
        let resp = req
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        Self::parse(resp).await
    }

    async fn rename_attr(
        &mut self,
        kind: AttrKind,
        id: Uuid,
        name: String,
    ) -> Result<Attr, RecipeClientError> {
        let url = self.url(&format!("{}/{}/", Self::attr_url(kind), id));
        let req = self.authorized(self.client.patch(url))?;
        let resp = req
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        Self::parse(resp).await
    }

    async fn delete_attr(&mut self, kind: AttrKind, id: Uuid) -> Result<(), RecipeClientError> {
        let url = self.url(&format!("{}/{}/", Self::attr_url(kind), id));
        let req = self.authorized(self.client.delete(url))?;
        Self::expect_empty(req.send().await?).await
    }

    async fn list_recipes(
        &mut self,
        tags: Vec<Uuid>,
        ingredients: Vec<Uuid>,
    ) -> Result<Vec<Recipe>, RecipeClientError> {
        let mut query = Vec::new();
        if !tags.is_empty() {
            query.push(("tags", join_ids(&tags)));
        }
        if !ingredients.is_empty() {
            query.push(("ingredients", join_ids(&ingredients)));
        }
        let req = self.authorized(self.client.get(self.url("/recipe/recipes/")))?;
        Self::parse(req.query(&query).send().await?).await
    }

    async fn get_recipe(&mut self, id: Uuid) -> Result<Recipe, RecipeClientError> {
        let url = self.url(&format!("/recipe/recipes/{}/", id));
        let req = self.authorized(self.client.get(url))?;
        Self::parse(req.send().await?).await
    }

    async fn create_recipe(&mut self, draft: RecipeDraft) -> Result<Recipe, RecipeClientError> {
        let req = self.authorized(self.client.post(self.url("/recipe/recipes/")))?;
        Self::parse(req.json(&draft).send().await?).await
    }

    async fn update_recipe(
        &mut self,
        id: Uuid,
        draft: RecipeDraft,
    ) -> Result<Recipe, RecipeClientError> {
        let url = self.url(&format!("/recipe/recipes/{}/", id));
        let req = self.authorized(self.client.patch(url))?;
        Self::parse(req.json(&draft).send().await?).await
    }

    async fn delete_recipe(&mut self, id: Uuid) -> Result<(), RecipeClientError> {
        let url = self.url(&format!("/recipe/recipes/{}/", id));
        let req = self.authorized(self.client.delete(url))?;
        Self::expect_empty(req.send().await?).await
    }

    async fn upload_image(
        &mut self,
        id: Uuid,
        path: &Path,
    ) -> Result<Option<String>, RecipeClientError> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let form = Form::new().part("image", Part::bytes(bytes).file_name(filename));

        let url = self.url(&format!("/recipe/recipes/{}/upload-image/", id));
        let req = self.authorized(self.client.post(url))?;
        let uploaded: ImageResponse = Self::parse(req.multipart(form).send().await?).await?;
        Ok(uploaded.image)
    }
}
