//! VST3 COM interactions: loading modules, reading class info, live
//! component/controller pairs and their editor views

use crate::{
    description::PluginDescription,
    error::{Error, Result},
    format::{NativeEditor, PluginInstance},
    internal::utils::{c_str_to_string, tuid_to_hex, vst_string_to_string},
    parameters::Parameter,
};
use libloading::{Library, Symbol};
use std::ffi::c_void;
use std::path::Path;
use std::ptr;
use std::rc::Rc;
use vst3::Steinberg::Vst::BusDirections_::*;
use vst3::Steinberg::Vst::MediaTypes_::*;
use vst3::Steinberg::{IPlugView, IPlugViewTrait};
use vst3::{ComPtr, Interface, Steinberg::Vst::*, Steinberg::*};

/// Category of classes that are audio processors
const AUDIO_MODULE_CLASS: &str = "Audio Module Class";

#[cfg(target_os = "macos")]
const PLATFORM_TYPE: &[u8] = b"NSView\0";
#[cfg(target_os = "windows")]
const PLATFORM_TYPE: &[u8] = b"HWND\0";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const PLATFORM_TYPE: &[u8] = b"X11EmbedWindowID\0";

/// A loaded VST3 binary and its factory
pub(crate) struct Vst3Module {
    factory: ComPtr<IPluginFactory>,
    // Dropped last: everything above points into the library
    _library: Library,
}

/// A class exported by a module's factory
pub(crate) struct ClassEntry {
    pub cid: TUID,
    pub name: String,
    pub vendor: String,
    pub version: String,
    pub sub_categories: String,
}

impl Vst3Module {
    /// Load a binary and fetch its plugin factory
    pub fn load(binary: &Path) -> Result<Self> {
        unsafe {
            let library = load_library(binary)?;

            type GetPluginFactoryFunc = unsafe extern "C" fn() -> *mut IPluginFactory;
            let get_factory: Symbol<GetPluginFactoryFunc> =
                library.get(b"GetPluginFactory\0").map_err(|e| {
                    Error::PluginLoadFailed(format!("Failed to find GetPluginFactory: {}", e))
                })?;

            let factory_ptr = get_factory();
            if factory_ptr.is_null() {
                return Err(Error::PluginLoadFailed(
                    "GetPluginFactory returned null".to_string(),
                ));
            }

            let factory = ComPtr::<IPluginFactory>::from_raw(factory_ptr).ok_or_else(|| {
                Error::PluginLoadFailed("Failed to create factory ComPtr".to_string())
            })?;

            Ok(Self {
                factory,
                _library: library,
            })
        }
    }

    /// Vendor from the factory info
    pub fn factory_vendor(&self) -> String {
        unsafe {
            let mut info: PFactoryInfo = std::mem::zeroed();
            if self.factory.getFactoryInfo(&mut info) == kResultOk {
                c_str_to_string(&info.vendor)
            } else {
                String::new()
            }
        }
    }

    /// Audio processor classes exported by the factory
    pub fn audio_classes(&self) -> Vec<ClassEntry> {
        let mut classes = Vec::new();
        unsafe {
            let factory2 = self.factory.cast::<IPluginFactory2>();
            let count = self.factory.countClasses();

            for i in 0..count {
                let mut info: PClassInfo = std::mem::zeroed();
                if self.factory.getClassInfo(i, &mut info) != kResultOk {
                    continue;
                }
                if c_str_to_string(&info.category) != AUDIO_MODULE_CLASS {
                    continue;
                }

                let mut entry = ClassEntry {
                    cid: info.cid,
                    name: c_str_to_string(&info.name),
                    vendor: String::new(),
                    version: String::new(),
                    sub_categories: String::new(),
                };

                if let Some(factory2) = &factory2 {
                    let mut info2: PClassInfo2 = std::mem::zeroed();
                    if factory2.getClassInfo2(i, &mut info2) == kResultOk {
                        entry.vendor = c_str_to_string(&info2.vendor);
                        entry.version = c_str_to_string(&info2.version);
                        entry.sub_categories = c_str_to_string(&info2.subCategories);
                    }
                }

                classes.push(entry);
            }
        }
        classes
    }

    unsafe fn create<I: Interface>(&self, cid: &TUID) -> Option<ComPtr<I>> {
        let mut instance: *mut I = ptr::null_mut();
        let result = self.factory.createInstance(
            cid.as_ptr() as *const i8,
            I::IID.as_ptr() as *const i8,
            &mut instance as *mut _ as *mut _,
        );
        if result == kResultOk && !instance.is_null() {
            ComPtr::from_raw(instance)
        } else {
            None
        }
    }
}

#[cfg(target_os = "windows")]
unsafe fn load_library(path: &Path) -> Result<Library> {
    use std::os::windows::ffi::OsStrExt;
    use winapi::um::libloaderapi::SetDllDirectoryW;

    // Let the plugin find DLLs shipped next to it
    if let Some(parent) = path.parent() {
        let wide: Vec<u16> = parent.as_os_str().encode_wide().chain(Some(0)).collect();
        SetDllDirectoryW(wide.as_ptr());
    }

    let result = Library::new(path)
        .map_err(|e| Error::PluginLoadFailed(format!("Failed to load VST3 DLL: {}", e)));

    SetDllDirectoryW(ptr::null());
    result
}

#[cfg(not(target_os = "windows"))]
unsafe fn load_library(path: &Path) -> Result<Library> {
    Library::new(path)
        .map_err(|e| Error::PluginLoadFailed(format!("Failed to load VST3 bundle: {}", e)))
}

/// Describe every audio class in a module
pub(crate) fn describe_module(
    module: &Vst3Module,
    bundle: &Path,
    format_name: &str,
) -> Vec<PluginDescription> {
    let factory_vendor = module.factory_vendor();

    module
        .audio_classes()
        .into_iter()
        .map(|class| {
            let (num_inputs, num_outputs) = unsafe { bus_counts(module, &class.cid) };
            let is_instrument = class.sub_categories.contains("Instrument");
            PluginDescription {
                name: class.name,
                manufacturer: if class.vendor.is_empty() {
                    factory_vendor.clone()
                } else {
                    class.vendor
                },
                category: class.sub_categories,
                version: class.version,
                file_or_identifier: bundle.to_string_lossy().into_owned(),
                plugin_format_name: format_name.to_string(),
                uid: tuid_to_hex(&class.cid),
                is_instrument,
                num_inputs,
                num_outputs,
                has_editor: true,
            }
        })
        .collect()
}

unsafe fn bus_counts(module: &Vst3Module, cid: &TUID) -> (u32, u32) {
    let Some(component) = module.create::<IComponent>(cid) else {
        return (0, 0);
    };
    if component.initialize(ptr::null_mut()) != kResultOk {
        return (0, 0);
    }
    let inputs = component.getBusCount(kAudio as i32, kInput as i32).max(0) as u32;
    let outputs = component.getBusCount(kAudio as i32, kOutput as i32).max(0) as u32;
    component.terminate();
    (inputs, outputs)
}

/// A live component with its edit controller
struct Vst3Core {
    component: ComPtr<IComponent>,
    controller: Option<ComPtr<IEditController>>,
    separate_controller: bool,
    // Kept alive for as long as anything from the module is
    _module: Rc<Vst3Module>,
}

impl Drop for Vst3Core {
    fn drop(&mut self) {
        unsafe {
            if self.separate_controller {
                if let Some(ref controller) = self.controller {
                    controller.terminate();
                }
            }
            self.component.terminate();
        }
    }
}

/// A VST3 plugin instance
pub(crate) struct Vst3Instance {
    core: Rc<Vst3Core>,
    has_editor: bool,
}

impl Vst3Instance {
    /// Create the class whose uid matches the description
    pub fn create(module: Vst3Module, desc: &PluginDescription) -> Result<Self> {
        let module = Rc::new(module);
        let class = module
            .audio_classes()
            .into_iter()
            .find(|class| tuid_to_hex(&class.cid) == desc.uid)
            .ok_or_else(|| {
                Error::PluginNotFound(format!("{} has no class {}", desc.file_or_identifier, desc.uid))
            })?;

        unsafe {
            let component = module.create::<IComponent>(&class.cid).ok_or_else(|| {
                Error::PluginLoadFailed(format!("Could not create component of {}", desc.name))
            })?;

            if component.initialize(ptr::null_mut()) != kResultOk {
                return Err(Error::PluginLoadFailed(format!(
                    "{} failed to initialize",
                    desc.name
                )));
            }

            let (controller, separate_controller) = match component.cast::<IEditController>() {
                Some(controller) => (Some(controller), false),
                None => {
                    let mut controller_cid: TUID = std::mem::zeroed();
                    let controller = if component.getControllerClassId(&mut controller_cid) == kResultOk {
                        module.create::<IEditController>(&controller_cid)
                    } else {
                        None
                    };
                    let controller = controller.filter(|c| c.initialize(ptr::null_mut()) == kResultOk);
                    (controller, true)
                }
            };

            let has_editor = match &controller {
                Some(controller) => probe_editor(controller),
                None => false,
            };

            Ok(Self {
                core: Rc::new(Vst3Core {
                    component,
                    controller,
                    separate_controller,
                    _module: module,
                }),
                has_editor,
            })
        }
    }
}

unsafe fn create_view(controller: &ComPtr<IEditController>) -> Option<ComPtr<IPlugView>> {
    let view_type = b"editor\0".as_ptr() as *const i8;
    let view_ptr = controller.createView(view_type);
    if view_ptr.is_null() {
        None
    } else {
        ComPtr::<IPlugView>::from_raw(view_ptr)
    }
}

unsafe fn probe_editor(controller: &ComPtr<IEditController>) -> bool {
    create_view(controller).is_some()
}

impl PluginInstance for Vst3Instance {
    fn parameters(&self) -> Vec<Parameter> {
        let mut params = Vec::new();

        if let Some(ref controller) = self.core.controller {
            unsafe {
                let count = controller.getParameterCount();

                for i in 0..count {
                    let mut info: ParameterInfo = std::mem::zeroed();
                    if controller.getParameterInfo(i, &mut info) != kResultOk {
                        continue;
                    }
                    params.push(Parameter {
                        id: info.id,
                        name: vst_string_to_string(&info.title),
                        value: controller.getParamNormalized(info.id),
                        min: controller.normalizedParamToPlain(info.id, 0.0),
                        max: controller.normalizedParamToPlain(info.id, 1.0),
                        default: info.defaultNormalizedValue,
                        unit: vst_string_to_string(&info.units),
                        step_count: info.stepCount,
                        is_read_only: (info.flags
                            & ParameterInfo_::ParameterFlags_::kIsReadOnly as i32)
                            != 0,
                        is_bypass: (info.flags
                            & ParameterInfo_::ParameterFlags_::kIsBypass as i32)
                            != 0,
                    });
                }
            }
        }

        params
    }

    fn set_parameter(&mut self, id: u32, normalized: f64) -> Result<()> {
        match self.core.controller {
            Some(ref controller) => {
                unsafe {
                    controller.setParamNormalized(id, normalized);
                }
                Ok(())
            }
            None => Err(Error::InterfaceError("No controller available".to_string())),
        }
    }

    fn has_editor(&self) -> bool {
        self.has_editor
    }

    fn create_editor(&mut self) -> Result<Box<dyn NativeEditor>> {
        let controller = self
            .core
            .controller
            .as_ref()
            .ok_or_else(|| Error::InterfaceError("No controller available".to_string()))?;

        let view = unsafe { create_view(controller) }
            .ok_or_else(|| Error::Other("Failed to create editor view".to_string()))?;

        unsafe {
            if view.isPlatformTypeSupported(PLATFORM_TYPE.as_ptr() as *const i8) != kResultOk {
                return Err(Error::Other("Platform type not supported".to_string()));
            }
        }

        Ok(Box::new(Vst3Editor {
            view,
            attached: false,
            _core: self.core.clone(),
        }))
    }
}

/// An `IPlugView` embedded in a native window
struct Vst3Editor {
    view: ComPtr<IPlugView>,
    attached: bool,
    _core: Rc<Vst3Core>,
}

impl NativeEditor for Vst3Editor {
    fn size(&self) -> (i32, i32) {
        let mut rect = ViewRect {
            left: 0,
            top: 0,
            right: 400,
            bottom: 300,
        };
        unsafe {
            if self.view.getSize(&mut rect) != kResultOk {
                return (400, 300);
            }
        }
        (rect.right - rect.left, rect.bottom - rect.top)
    }

    fn can_resize(&self) -> bool {
        unsafe { self.view.canResize() == kResultTrue }
    }

    fn check_size_constraint(&mut self, width: i32, height: i32) -> (i32, i32) {
        let mut rect = ViewRect {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        };
        unsafe {
            if self.view.checkSizeConstraint(&mut rect) != kResultOk {
                return (width, height);
            }
        }
        (rect.right - rect.left, rect.bottom - rect.top)
    }

    fn set_size(&mut self, width: i32, height: i32) {
        let mut rect = ViewRect {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        };
        unsafe {
            self.view.onSize(&mut rect);
        }
    }

    fn attach(&mut self, parent: *mut c_void) -> Result<()> {
        if self.attached {
            return Ok(());
        }
        unsafe {
            let result = self
                .view
                .attached(parent, PLATFORM_TYPE.as_ptr() as *const i8);
            if result != kResultOk {
                return Err(Error::Other(format!("Failed to attach view: {:#x}", result)));
            }
        }
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self) {
        if self.attached {
            unsafe {
                self.view.removed();
            }
            self.attached = false;
        }
    }
}

impl Drop for Vst3Editor {
    fn drop(&mut self) {
        self.detach();
    }
}
