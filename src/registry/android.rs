//! Package registry backed by Android's `PackageManager`
//!
//! Reference:
//! <https://developer.android.com/reference/android/content/pm/PackageManager>
//!
//! - Enumeration: `getInstalledPackages(0)`, system flag read from
//!   `PackageInfo.applicationInfo.flags & ApplicationInfo.FLAG_SYSTEM`
//! - Label resolution: `loadLabel(pm).toString()` on the `ApplicationInfo` captured
//!   during the most recent enumeration, or on `getApplicationInfo(name, 0)` for
//!   packages that enumeration did not see
//!
//! Java exceptions raised by these calls are cleared before returning, and their
//! `getMessage()` text becomes the error message. `SecurityException` maps to
//! [`RegistryError::PermissionDenied`]. Only `NameNotFoundException` and failures
//! inside `loadLabel` count as [`RegistryError::LabelUnresolved`]; everything else
//! is a registry failure.
//!
//! The host app must declare `QUERY_ALL_PACKAGES` (or matching `<queries>`) on
//! Android 11+, otherwise the OS silently filters the package list.

use super::{PackageMetadata, PackageRegistry};
use crate::error::{RegistryError, StringError};
use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};
use parking_lot::Mutex;
use std::collections::HashMap;

/// `android.content.pm.ApplicationInfo.FLAG_SYSTEM`
const FLAG_SYSTEM: i32 = 0x1;

const NAME_NOT_FOUND_EXCEPTION: &str = "android/content/pm/PackageManager$NameNotFoundException";

/// Exception kinds that concern a single package's label when raised by `getApplicationInfo`
const LOOKUP_LABEL_ERRORS: &[ExceptionKind] = &[ExceptionKind::NameNotFound];

/// Exception kinds that concern a single package's label when raised by `loadLabel`
const LOAD_LABEL_ERRORS: &[ExceptionKind] = &[ExceptionKind::NameNotFound, ExceptionKind::Other];

impl From<jni::errors::Error> for RegistryError {
    fn from(e: jni::errors::Error) -> Self {
        Self::Platform(Box::new(e))
    }
}

/// Android `PackageManager` registry
pub struct AndroidPackageRegistry {
    vm: JavaVM,
    context: GlobalRef,
    /// `ApplicationInfo` of each user package from the latest enumeration
    app_infos: Mutex<HashMap<String, GlobalRef>>,
}

impl AndroidPackageRegistry {
    /// Bind to the JVM and application context published through `ndk-context`
    #[expect(
        unsafe_code,
        reason = "JavaVM and Context pointers are provided by the Android glue via ndk-context"
    )]
    pub fn from_android_context() -> Result<Self, RegistryError> {
        let ctx = ndk_context::android_context();
        // SAFETY: ndk_context hands out the process JavaVM pointer, valid for the process lifetime.
        let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }.map_err(|e| {
            RegistryError::Unavailable(format!("Expected to find JVM via ndk_context crate: {e}"))
        })?;

        let context = {
            let mut env = vm.attach_current_thread().map_err(|e| {
                RegistryError::Unavailable(format!("Failed to attach current thread: {e}"))
            })?;
            // SAFETY: the context pointer is a global reference owned by the Android glue.
            let activity = unsafe { JObject::from_raw(ctx.context().cast()) };
            env.new_global_ref(&activity)?
        };

        Ok(Self::new(vm, context))
    }

    /// Wrap an already-obtained VM and `android.content.Context` reference
    pub fn new(vm: JavaVM, context: GlobalRef) -> Self {
        Self {
            vm,
            context,
            app_infos: Mutex::new(HashMap::new()),
        }
    }

    fn attach(&self) -> Result<jni::AttachGuard<'_>, RegistryError> {
        self.vm.attach_current_thread().map_err(|e| {
            RegistryError::Unavailable(format!("Failed to attach current thread: {e}"))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExceptionKind {
    Security,
    NameNotFound,
    Other,
}

fn is_instance(env: &mut JNIEnv, object: &JObject, class: &str) -> bool {
    env.is_instance_of(object, class).unwrap_or(false)
}

/// Clear the pending Java exception, returning its message and kind
fn take_exception(env: &mut JNIEnv) -> Option<(String, ExceptionKind)> {
    let throwable = env.exception_occurred().ok()?;
    env.exception_clear().ok()?;
    if throwable.is_null() {
        return None;
    }

    let kind = if is_instance(env, &throwable, "java/lang/SecurityException") {
        ExceptionKind::Security
    } else if is_instance(env, &throwable, NAME_NOT_FOUND_EXCEPTION) {
        ExceptionKind::NameNotFound
    } else {
        ExceptionKind::Other
    };

    let message = env
        .call_method(&throwable, "getMessage", "()Ljava/lang/String;", &[])
        .and_then(|v| v.l())
        .ok()
        .filter(|obj| !obj.is_null())
        .or_else(|| {
            env.call_method(&throwable, "toString", "()Ljava/lang/String;", &[])
                .and_then(|v| v.l())
                .ok()
        })
        .and_then(|obj| java_string(env, obj).ok())?;

    Some((message, kind))
}

/// Map a Java exception to a registry error
///
/// `label_errors` lists the kinds that only affect `package_name`'s label.
fn exception_error(
    package_name: Option<&str>,
    kind: ExceptionKind,
    message: String,
    label_errors: &[ExceptionKind],
) -> RegistryError {
    match (package_name, kind) {
        (Some(package_name), kind) if label_errors.contains(&kind) => {
            RegistryError::LabelUnresolved {
                package_name: package_name.to_string(),
                message,
            }
        }
        (_, ExceptionKind::Security) => RegistryError::PermissionDenied(message),
        _ => RegistryError::Platform(StringError::new(message)),
    }
}

/// Translate a failed JNI call into a registry error
fn java_failure(env: &mut JNIEnv, call: &str, err: jni::errors::Error) -> RegistryError {
    call_failure(env, None, call, err, &[])
}

/// Translate a failed JNI call made while resolving `package_name`'s label
fn label_failure(
    env: &mut JNIEnv,
    package_name: &str,
    call: &str,
    err: jni::errors::Error,
    label_errors: &[ExceptionKind],
) -> RegistryError {
    call_failure(env, Some(package_name), call, err, label_errors)
}

fn call_failure(
    env: &mut JNIEnv,
    package_name: Option<&str>,
    call: &str,
    err: jni::errors::Error,
    label_errors: &[ExceptionKind],
) -> RegistryError {
    if matches!(err, jni::errors::Error::JavaException) {
        if let Some((message, kind)) = take_exception(env) {
            return exception_error(package_name, kind, message, label_errors);
        }
    }
    RegistryError::Platform(StringError::new(format!("{call} failed: {err}")))
}

fn java_string(env: &mut JNIEnv, obj: JObject) -> Result<String, jni::errors::Error> {
    let jstr = JString::from(obj);
    let value: String = env.get_string(&jstr)?.into();
    Ok(value)
}

fn package_manager<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject,
) -> Result<JObject<'local>, RegistryError> {
    env.call_method(
        context,
        "getPackageManager",
        "()Landroid/content/pm/PackageManager;",
        &[],
    )
    .and_then(|v| v.l())
    .map_err(|e| java_failure(env, "getPackageManager", e))
}

/// Read one `PackageInfo` and its `ApplicationInfo`; `None` when it carries no application
fn read_package_info<'local>(
    env: &mut JNIEnv<'local>,
    info: &JObject,
) -> Result<Option<(PackageMetadata, JObject<'local>)>, RegistryError> {
    let name_obj = env
        .get_field(info, "packageName", "Ljava/lang/String;")
        .and_then(|v| v.l())
        .map_err(|e| java_failure(env, "PackageInfo.packageName", e))?;
    let package_name = java_string(env, name_obj)?;

    let app_info = env
        .get_field(
            info,
            "applicationInfo",
            "Landroid/content/pm/ApplicationInfo;",
        )
        .and_then(|v| v.l())
        .map_err(|e| java_failure(env, "PackageInfo.applicationInfo", e))?;

    if app_info.is_null() {
        tracing::debug!("Package {} has no application info", package_name);
        return Ok(None);
    }

    let flags = env
        .get_field(&app_info, "flags", "I")
        .and_then(|v| v.i())
        .map_err(|e| java_failure(env, "ApplicationInfo.flags", e))?;

    let metadata = PackageMetadata {
        package_name,
        is_system: flags & FLAG_SYSTEM != 0,
        lookup_key: None,
    };
    Ok(Some((metadata, app_info)))
}

impl PackageRegistry for AndroidPackageRegistry {
    fn list_packages(&self) -> Result<Vec<PackageMetadata>, RegistryError> {
        let mut env = self.attach()?;
        let pm = package_manager(&mut env, self.context.as_obj())?;

        let list = env
            .call_method(
                &pm,
                "getInstalledPackages",
                "(I)Ljava/util/List;",
                &[JValue::Int(0)],
            )
            .and_then(|v| v.l())
            .map_err(|e| java_failure(&mut env, "getInstalledPackages", e))?;

        let size = env
            .call_method(&list, "size", "()I", &[])
            .and_then(|v| v.i())
            .map_err(|e| java_failure(&mut env, "List.size", e))?;

        let capacity = usize::try_from(size).unwrap_or_default();
        let mut packages = Vec::with_capacity(capacity);
        let mut app_infos = HashMap::with_capacity(capacity);
        for i in 0..size {
            // Fresh local frame per entry keeps the local reference table bounded
            let entry = env.with_local_frame(8, |env| -> Result<_, RegistryError> {
                let info = env
                    .call_method(&list, "get", "(I)Ljava/lang/Object;", &[JValue::Int(i)])
                    .and_then(|v| v.l())
                    .map_err(|e| java_failure(env, "List.get", e))?;
                let Some((metadata, app_info)) = read_package_info(env, &info)? else {
                    return Ok(None);
                };
                // System packages never reach label resolution
                let app_info = if metadata.is_system {
                    None
                } else {
                    Some(env.new_global_ref(&app_info)?)
                };
                Ok(Some((metadata, app_info)))
            })?;

            if let Some((metadata, app_info)) = entry {
                if let Some(app_info) = app_info {
                    app_infos
                        .entry(metadata.package_name.clone())
                        .or_insert(app_info);
                }
                packages.push(metadata);
            }
        }

        *self.app_infos.lock() = app_infos;
        tracing::debug!("PackageManager reported {} packages", packages.len());
        Ok(packages)
    }

    fn resolve_label(&self, package: &PackageMetadata) -> Result<String, RegistryError> {
        let key = package.lookup_key();
        let enumerated = self.app_infos.lock().get(key).cloned();

        let mut env = self.attach()?;
        env.with_local_frame(8, |env| -> Result<String, RegistryError> {
            let pm = package_manager(env, self.context.as_obj())?;

            let app_info = match &enumerated {
                Some(app_info) => env.new_local_ref(app_info)?,
                None => {
                    tracing::debug!("{} was not enumerated, looking it up", key);
                    let name = env.new_string(key)?;
                    env.call_method(
                        &pm,
                        "getApplicationInfo",
                        "(Ljava/lang/String;I)Landroid/content/pm/ApplicationInfo;",
                        &[JValue::Object(&name), JValue::Int(0)],
                    )
                    .and_then(|v| v.l())
                    .map_err(|e| {
                        label_failure(
                            env,
                            &package.package_name,
                            "getApplicationInfo",
                            e,
                            LOOKUP_LABEL_ERRORS,
                        )
                    })?
                }
            };

            let label = env
                .call_method(
                    &app_info,
                    "loadLabel",
                    "(Landroid/content/pm/PackageManager;)Ljava/lang/CharSequence;",
                    &[JValue::Object(&pm)],
                )
                .and_then(|v| v.l())
                .map_err(|e| {
                    label_failure(env, &package.package_name, "loadLabel", e, LOAD_LABEL_ERRORS)
                })?;

            let text = env
                .call_method(&label, "toString", "()Ljava/lang/String;", &[])
                .and_then(|v| v.l())
                .map_err(|e| {
                    label_failure(
                        env,
                        &package.package_name,
                        "CharSequence.toString",
                        e,
                        LOAD_LABEL_ERRORS,
                    )
                })?;

            java_string(env, text).map_err(RegistryError::from)
        })
    }
}
