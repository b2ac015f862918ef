use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use crate::models::auth::responses::{LoginResponse, TokenClaims};
use crate::models::user::{Caller, User};
use crate::services::errors::auth_service_errors::AuthServiceError;
use crate::services::user_service::UserService;

const TOKEN_LIFETIME_HOURS: i64 = 24;

pub trait AuthServiceTrait: Send + Sync {
    async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthServiceError>;
    fn generate_token(&self, user: &User) -> Result<LoginResponse, AuthServiceError>;
    fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthServiceError>;
    fn caller_from_token(&self, token: &str) -> Result<Caller, AuthServiceError>;
}

pub struct AuthService {
    user_service: Arc<UserService>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_service: Arc<UserService>, jwt_secret: &str) -> Self {
        AuthService {
            user_service,
            jwt_secret: jwt_secret.to_string(),
        }
    }
}

impl AuthServiceTrait for AuthService {
    async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthServiceError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthServiceError::InvalidCredentials);
        }

        let user = self.user_service.get_user_by_username(username).await?;
        if !user.verify_password(password) {
            return Err(AuthServiceError::InvalidCredentials);
        }
        self.generate_token(&user)
    }

    fn generate_token(&self, user: &User) -> Result<LoginResponse, AuthServiceError> {
        let now = Utc::now();
        let expires_in = TOKEN_LIFETIME_HOURS * 60 * 60;
        let exp = (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize;
        let iat = now.timestamp() as usize;

        let claims = TokenClaims {
            sub: user.id.clone(),
            username: user.username.clone(),
            exp,
            iat,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(|e| AuthServiceError::JwtError(format!("{:#?}", e)))?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
        })
    }

    fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let validation = Validation::default();

        match decode::<TokenClaims>(token, &decoding_key, &validation) {
            Ok(token_data) => Ok(token_data.claims),
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    Err(AuthServiceError::ExpiredToken)
                }
                _ => Err(AuthServiceError::InvalidToken),
            },
        }
    }

    fn caller_from_token(&self, token: &str) -> Result<Caller, AuthServiceError> {
        let claims = self.verify_token(token)?;
        Ok(Caller::new(&claims.sub, &claims.username))
    }
}
