//! Body extractor for recipe writes: JSON (image as data URI) or
//! `multipart/form-data` (image as a file part).

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::features::recipes::image::{self, RecipeImage};

/// A recipe write body and the uploaded image, if sent as a file part
pub struct RecipeForm<T> {
    pub dto: T,
    pub upload: Option<RecipeImage>,
}

impl<T, S> FromRequest<S> for RecipeForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let AppJson(dto) = AppJson::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(Self { dto, upload: None });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))
            .map_err(IntoResponse::into_response)?;

        read_multipart(multipart)
            .await
            .map_err(IntoResponse::into_response)
    }
}

async fn read_multipart<T: DeserializeOwned>(
    mut multipart: Multipart,
) -> Result<RecipeForm<T>, AppError> {
    let mut fields = Map::new();
    let mut tags: Option<Vec<Value>> = None;
    let mut ingredients: Option<Vec<Value>> = None;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" && (field.file_name().is_some() || field.content_type().is_some()) {
            let content_type = field.content_type().map(str::to_string);
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?;
            upload = Some(image::from_upload(
                content_type.as_deref(),
                file_name.as_deref(),
                bytes.to_vec(),
            )?);
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read field '{}': {}", name, e)))?;

        match name.as_str() {
            "tags" => push_list_value(tags.get_or_insert_with(Vec::new), &text),
            "ingredients" => push_list_value(ingredients.get_or_insert_with(Vec::new), &text),
            "cooking_time" => {
                let value = text
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .unwrap_or(Value::String(text));
                fields.insert(name, value);
            }
            _ => {
                fields.insert(name, Value::String(text));
            }
        }
    }

    if let Some(tags) = tags {
        fields.insert("tags".to_string(), Value::Array(tags));
    }
    if let Some(ingredients) = ingredients {
        fields.insert("ingredients".to_string(), Value::Array(ingredients));
    }

    let dto = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?;

    Ok(RecipeForm { dto, upload })
}

/// A list part is either a JSON array or a single (repeated) element
fn push_list_value(list: &mut Vec<Value>, raw: &str) {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Array(items)) => list.extend(items),
        Ok(value) => list.push(value),
        Err(_) => list.push(Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::recipes::dtos::CreateRecipeDto;
    use axum::body::Body;
    use axum::http::StatusCode;

    const BOUNDARY: &str = "foodgramboundary";

    fn multipart_request(parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Request {
        let mut body = Vec::new();
        for (name, file, content) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match file {
                Some((file_name, content_type)) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                            name, file_name, content_type
                        )
                        .as_bytes(),
                    );
                }
                None => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/recipes")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn test_push_list_value() {
        let mut list = Vec::new();
        push_list_value(&mut list, "[1, 2]");
        push_list_value(&mut list, "3");
        push_list_value(&mut list, r#"{"id": 4, "amount": 5}"#);
        assert_eq!(list.len(), 4);
        assert_eq!(list[2], Value::from(3));
        assert_eq!(list[3]["amount"], Value::from(5));
    }

    #[tokio::test]
    async fn test_multipart_with_file_part() {
        let req = multipart_request(&[
            ("name", None, b"Pancakes"),
            ("text", None, b"Mix and fry"),
            ("cooking_time", None, b"20"),
            ("tags", None, b"1"),
            ("tags", None, b"2"),
            ("ingredients", None, br#"[{"id": 7, "amount": 200}]"#),
            ("image", Some(("pancakes.png", "image/png")), b"\x89PNG"),
        ]);

        let form = RecipeForm::<CreateRecipeDto>::from_request(req, &())
            .await
            .unwrap_or_else(|_| panic!("multipart body should parse"));

        assert_eq!(form.dto.name, "Pancakes");
        assert_eq!(form.dto.cooking_time, 20);
        assert_eq!(form.dto.tags, vec![1, 2]);
        assert_eq!(form.dto.ingredients[0].id, 7);
        assert!(form.dto.image.is_none());

        let upload = form.upload.unwrap();
        assert_eq!(upload.extension, "png");
        assert_eq!(upload.bytes, b"\x89PNG");
    }

    #[tokio::test]
    async fn test_multipart_rejects_bad_image_type() {
        let req = multipart_request(&[
            ("name", None, b"Pancakes"),
            ("image", Some(("notes.txt", "text/plain")), b"hello"),
        ]);

        let rejection = RecipeForm::<CreateRecipeDto>::from_request(req, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_json_body() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/recipes")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"ingredients":[{"id":1,"amount":2}],"tags":[1],"image":"data:image/png;base64,iVBORw0KGgo=","name":"Tea","text":"Brew","cooking_time":3}"#,
            ))
            .unwrap();

        let form = RecipeForm::<CreateRecipeDto>::from_request(req, &())
            .await
            .unwrap_or_else(|_| panic!("json body should parse"));
        assert_eq!(form.dto.name, "Tea");
        assert!(form.upload.is_none());
    }
}
