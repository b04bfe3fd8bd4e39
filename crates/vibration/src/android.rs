//! Android host backed by JNI.
//!
//! The host activity loads the library and calls
//! `com.example.mr_x_app.VibrationBridge.nativeAttach(context)` once from
//! `configureFlutterEngine`. That fills in `ndk-context` with the VM and the
//! application context and builds the channels. Its method channel handler
//! then forwards each JSON envelope through `nativeSend(channel, bytes)` and
//! passes the returned reply back to the UI layer:
//!
//! ```java
//! final class VibrationBridge {
//!     static { System.loadLibrary("mrx_vibration"); }
//!     static native boolean nativeAttach(Context context);
//!     static native byte[] nativeSend(String channel, byte[] message);
//! }
//! ```

use crate::bridge;
use crate::channel::{AttachedChannels, MessagingContext};
use crate::config::BridgeConfig;
use crate::error::{Result, VibrationError};
use crate::platform::{Amplitude, ApiLevel, HostContext, Vibrator};
use jni::objects::{GlobalRef, JByteArray, JClass, JObject, JString, JValue};
use jni::sys::{jboolean, jbyteArray, jobject, JNI_FALSE, JNI_TRUE};
use jni::{JNIEnv, JavaVM};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{info, warn};

/// Channels built by `nativeAttach`, used by `nativeSend`.
static CHANNELS: AttachedChannels = AttachedChannels::new();

/// Application context handed to `ndk-context`; kept alive for the process.
static APP_CONTEXT: OnceCell<GlobalRef> = OnceCell::new();

impl From<jni::errors::Error> for VibrationError {
    fn from(e: jni::errors::Error) -> Self {
        VibrationError::Platform(e.to_string())
    }
}

fn java_vm() -> Result<JavaVM> {
    let context = ndk_context::android_context();
    Ok(unsafe { JavaVM::from_raw(context.vm().cast())? })
}

/// Run a closure with an attached JNI environment and the Activity context.
fn with_jni_context<F, R>(closure: F) -> Result<R>
where
    for<'j> F: FnOnce(&mut JNIEnv<'j>, JObject<'j>) -> Result<R>,
{
    let vm = java_vm()?;
    let mut env = vm.attach_current_thread()?;
    let ctx = unsafe { JObject::from_raw(ndk_context::android_context().context() as jobject) };
    let result = closure(&mut *env, ctx);
    if result.is_err() {
        clear_pending_exception(&mut *env);
    }
    result
}

/// Describe and clear a Java exception left pending by a failed call.
///
/// A pending exception would be rethrown in the Java caller once the native
/// call returns, and no further JNI call is allowed while one is pending.
fn clear_pending_exception(env: &mut JNIEnv<'_>) -> bool {
    if !env.exception_check().unwrap_or(false) {
        return false;
    }
    let _ = env.exception_describe();
    let _ = env.exception_clear();
    warn!("Cleared pending Java exception");
    true
}

/// `android.os.Vibrator` held as a global reference.
pub struct AndroidVibrator {
    inner: GlobalRef,
}

fn millis_arg(duration_millis: u64) -> i64 {
    i64::try_from(duration_millis).unwrap_or(i64::MAX)
}

impl Vibrator for AndroidVibrator {
    fn has_vibrator(&self) -> bool {
        with_jni_context(|env, _ctx| {
            Ok(env
                .call_method(self.inner.as_obj(), "hasVibrator", "()Z", &[])?
                .z()?)
        })
        .unwrap_or_else(|e| {
            warn!(error = %e, "hasVibrator() failed");
            false
        })
    }

    fn vibrate_one_shot(&self, duration_millis: u64, amplitude: Amplitude) -> Result<()> {
        with_jni_context(|env, _ctx| {
            let effect = env
                .call_static_method(
                    "android/os/VibrationEffect",
                    "createOneShot",
                    "(JI)Landroid/os/VibrationEffect;",
                    &[
                        JValue::Long(millis_arg(duration_millis)),
                        JValue::Int(amplitude.as_platform_value()),
                    ],
                )?
                .l()?;
            env.call_method(
                self.inner.as_obj(),
                "vibrate",
                "(Landroid/os/VibrationEffect;)V",
                &[(&effect).into()],
            )?;
            Ok(())
        })
    }

    fn vibrate_legacy(&self, duration_millis: u64) -> Result<()> {
        with_jni_context(|env, _ctx| {
            env.call_method(
                self.inner.as_obj(),
                "vibrate",
                "(J)V",
                &[JValue::Long(millis_arg(duration_millis))],
            )?;
            Ok(())
        })
    }
}

/// [`HostContext`] for the running Android activity.
#[derive(Debug, Default, Clone, Copy)]
pub struct AndroidHost;

impl AndroidHost {
    fn lookup_vibrator(&self) -> Result<AndroidVibrator> {
        with_jni_context(|env, ctx| {
            let name = env.new_string("vibrator")?;
            let service = env
                .call_method(
                    &ctx,
                    "getSystemService",
                    "(Ljava/lang/String;)Ljava/lang/Object;",
                    &[(&name).into()],
                )?
                .l()?;
            if service.is_null() {
                return Err(VibrationError::ServiceUnavailable);
            }
            Ok(AndroidVibrator {
                inner: env.new_global_ref(service)?,
            })
        })
    }
}

impl HostContext for AndroidHost {
    fn api_level(&self) -> ApiLevel {
        let level = with_jni_context(|env, _ctx| {
            Ok(env
                .get_static_field("android/os/Build$VERSION", "SDK_INT", "I")?
                .i()?)
        });
        match level {
            Ok(level) => ApiLevel(u32::try_from(level).unwrap_or(0)),
            Err(e) => {
                // Unknown level selects the legacy driver.
                warn!(error = %e, "Could not read SDK_INT");
                ApiLevel(0)
            }
        }
    }

    fn vibrator(&self) -> Option<Arc<dyn Vibrator>> {
        match self.lookup_vibrator() {
            Ok(vibrator) => Some(Arc::new(vibrator)),
            Err(e) => {
                warn!(error = %e, "Vibrator service lookup failed");
                None
            }
        }
    }
}

/// Activity startup: bring up logging and return a context with the bridge
/// installed. `ndk-context` must already be initialised.
pub fn bootstrap(config: BridgeConfig) -> Result<MessagingContext> {
    if let Err(e) = mrx_telemetry::init() {
        warn!(error = %e, "Telemetry init failed");
    }
    bridge::attach(Arc::new(AndroidHost), config)
}

/// Hand the VM and application context to `ndk-context`, exactly once.
fn init_android_context(env: &mut JNIEnv<'_>, context: &JObject<'_>) -> Result<()> {
    APP_CONTEXT.get_or_try_init(|| -> Result<GlobalRef> {
        let app = env
            .call_method(context, "getApplicationContext", "()Landroid/content/Context;", &[])?
            .l()?;
        let app = env.new_global_ref(app)?;
        let vm = env.get_java_vm()?;
        unsafe {
            ndk_context::initialize_android_context(
                vm.get_java_vm_pointer().cast(),
                app.as_obj().as_raw().cast(),
            );
        }
        Ok(app)
    })?;
    Ok(())
}

fn attach_native(env: &mut JNIEnv<'_>, context: &JObject<'_>) -> Result<()> {
    CHANNELS.attach_with(|| {
        init_android_context(env, context)?;
        let channels = bootstrap(BridgeConfig::load(None)?)?;
        info!("Native vibration bridge attached");
        Ok(channels)
    })?;
    Ok(())
}

fn send_native<'local>(
    env: &mut JNIEnv<'local>,
    channel: &JString<'local>,
    message: &JByteArray<'local>,
) -> Result<jbyteArray> {
    let channel: String = env.get_string(channel)?.into();
    let message = env.convert_byte_array(message)?;
    let reply = CHANNELS.send(&channel, &message)?;
    Ok(env.byte_array_from_slice(&reply)?.into_raw())
}

/// `static native boolean nativeAttach(Context context)`
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_example_mr_1x_1app_VibrationBridge_nativeAttach<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    context: JObject<'local>,
) -> jboolean {
    match attach_native(&mut env, &context) {
        Ok(()) => JNI_TRUE,
        Err(e) => {
            clear_pending_exception(&mut env);
            warn!(error = %e, "nativeAttach failed");
            JNI_FALSE
        }
    }
}

/// `static native byte[] nativeSend(String channel, byte[] message)`
///
/// Returns the encoded reply (empty for not-implemented), or null if the
/// bridge was never attached or the arguments could not be read.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn Java_com_example_mr_1x_1app_VibrationBridge_nativeSend<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    channel: JString<'local>,
    message: JByteArray<'local>,
) -> jbyteArray {
    match send_native(&mut env, &channel, &message) {
        Ok(reply) => reply,
        Err(e) => {
            clear_pending_exception(&mut env);
            warn!(error = %e, code = ?e.code(), "nativeSend failed");
            std::ptr::null_mut()
        }
    }
}
