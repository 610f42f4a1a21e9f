// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Input forms and client-side validation.
//!
//! Every check here runs before a request is built; failures surface as
//! `AppError::Validation` and never reach the network.

use crate::config::AppVariant;
use crate::error::AppError;
use crate::models::{Address, Category};
use serde::Serialize;
use std::borrow::Cow;
use std::path::Path;
use validator::{Validate, ValidationError};

/// Spreadsheet extensions the transaction import accepts.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Image extensions the prize image upload accepts.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Largest prize image the server accepts.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Mainland mobile number: 11 digits, `1` then `3`-`9`.
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let bytes = phone.as_bytes();
    let ok = bytes.len() == 11
        && bytes.iter().all(u8::is_ascii_digit)
        && bytes[0] == b'1'
        && (b'3'..=b'9').contains(&bytes[1]);
    if ok {
        Ok(())
    } else {
        Err(invalid("phone", "请输入有效的手机号"))
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(invalid("blank", "不能为空"))
    } else {
        Ok(())
    }
}

fn validate_cost(points: f64) -> Result<(), ValidationError> {
    if points.is_finite() && points > 0.0 {
        Ok(())
    } else {
        Err(invalid("points", "积分必须大于0"))
    }
}

fn validate_balance(points: f64) -> Result<(), ValidationError> {
    if points.is_finite() && points >= 0.0 {
        Ok(())
    } else {
        Err(invalid("points", "积分必须是非负数"))
    }
}

/// Phone + password login.
///
/// The seeded admin account logs in with a non-numeric "phone", so the
/// mobile number format is only enforced by [`LoginForm::check`] in the
/// consumer app.
#[derive(Debug, Clone, Validate)]
pub struct LoginForm {
    #[validate(custom(function = "validate_not_blank", message = "请输入手机号"))]
    pub phone: String,
    #[validate(length(min = 1, message = "请输入密码"))]
    pub password: String,
}

impl LoginForm {
    pub fn check(&self, variant: AppVariant) -> Result<(), AppError> {
        self.validate()?;
        if variant == AppVariant::Consumer {
            validate_phone(self.phone.trim()).map_err(|e| {
                AppError::Validation(e.message.map(|m| m.to_string()).unwrap_or_default())
            })?;
        }
        Ok(())
    }
}

/// Consumer self-registration.
#[derive(Debug, Clone, Validate)]
pub struct RegisterForm {
    #[validate(custom(function = "validate_not_blank", message = "请输入昵称"))]
    pub nickname: String,
    #[validate(custom(function = "validate_not_blank", message = "请输入快手ID"))]
    pub kuaishou_id: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(length(min = 8, message = "密码至少8位"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "两次输入的密码不一致"))]
    pub confirm_password: String,
    /// Inviting user id from the invite link, if any
    pub inviter: Option<String>,
}

/// New prize (admin). Name and a positive cost are required.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct PrizeForm {
    #[validate(custom(function = "validate_not_blank", message = "请填写奖品名称"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[validate(custom(function = "validate_cost"))]
    pub points: f64,
    pub category: Category,
    pub stock: u32,
}

/// Partial prize edit; only present fields are sent.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct PrizeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_not_blank", message = "请填写奖品名称"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_cost"))]
    pub points: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl PrizeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.points.is_none()
            && self.category.is_none()
            && self.stock.is_none()
    }
}

/// Admin user edit.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_not_blank", message = "昵称不能为空"))]
    pub nickname: Option<String>,
    #[serde(rename = "kuaishouId", skip_serializing_if = "Option::is_none")]
    pub kuaishou_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_not_blank", message = "手机号不能为空"))]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_balance"))]
    pub points: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

/// Reject a blank shipping address.
pub fn check_address(address: &Address) -> Result<(), AppError> {
    if address.is_blank() {
        return Err(AppError::Validation("请输入有效的收货地址".to_string()));
    }
    Ok(())
}

/// Lowercased extension of a file name, if any.
fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Only the extension is checked; the server parses the content.
pub fn check_spreadsheet_name(name: &str) -> Result<(), AppError> {
    match extension(name) {
        Some(ext) if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(AppError::Validation(
            "请选择Excel文件（.xlsx或.xls格式）".to_string(),
        )),
    }
}

pub fn check_image(name: &str, size: u64) -> Result<(), AppError> {
    match extension(name) {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => {
            return Err(AppError::Validation(
                "只支持 PNG、JPG、JPEG、GIF、WEBP 格式的图片".to_string(),
            ))
        }
    }
    if size > MAX_IMAGE_BYTES {
        return Err(AppError::Validation("图片大小不能超过5MB".to_string()));
    }
    Ok(())
}
